//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};

use std::sync::Arc;

use crate::domain::ports::{
    MockBillingCommand, MockDocumentCommand, MockDocumentExportCommand, MockDocumentQuery,
    MockPlanQuery,
};
use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Route standing in for the external login service.
pub const TEST_LOGIN_PATH: &str = "/test/login/{user_id}";

/// Session middleware with a fresh key, cookie `session`, and `Secure` off.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by a response.
pub fn session_cookie<B>(response: &ServiceResponse<B>) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie set")
}

async fn test_login(session: SessionContext, path: web::Path<i64>) -> Result<HttpResponse, Error> {
    let user_id = UserId::new(path.into_inner())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Register the login stand-in on an app.
pub fn login_shim(cfg: &mut web::ServiceConfig) {
    cfg.route(TEST_LOGIN_PATH, web::get().to(test_login));
}

/// Log in through the stand-in route and return the session cookie.
pub async fn login<S, B>(app: &S, user_id: i64) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
{
    let request = test::TestRequest::get()
        .uri(&format!("/test/login/{user_id}"))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "test login failed");
    session_cookie(&response)
}

/// Mock driving ports. Unconfigured mocks fail the test when called.
#[derive(Default)]
pub struct MockPorts {
    pub exports: MockDocumentExportCommand,
    pub documents: MockDocumentCommand,
    pub documents_query: MockDocumentQuery,
    pub billing: MockBillingCommand,
    pub plans: MockPlanQuery,
}

impl MockPorts {
    pub fn into_state(self) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            exports: Arc::new(self.exports),
            documents: Arc::new(self.documents),
            documents_query: Arc::new(self.documents_query),
            billing: Arc::new(self.billing),
            plans: Arc::new(self.plans),
        }))
    }
}
