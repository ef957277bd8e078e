//! Shared harness driving the full HTTP app against the in-memory store.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};
use chrono::{DateTime, Local, Utc};
use mockable::{Clock, DefaultClock};

use assignment_formatter::Trace;
use assignment_formatter::domain::{
    BillingService, Document, DocumentExportService, DocumentId, DocumentService, DocumentStatus,
    Error, PlanId, UserAccount, UserId,
};
use assignment_formatter::inbound::http::configure;
use assignment_formatter::inbound::http::health::HealthState;
use assignment_formatter::inbound::http::session::SessionContext;
use assignment_formatter::inbound::http::state::{HttpState, HttpStatePorts};
use assignment_formatter::outbound::export::default_encoders;
use assignment_formatter::outbound::memory::{InMemoryStore, StoreState, default_plans};

pub const CONTENT: &str = "<h1>Title</h1><p>Body text</p><ul><li>A</li><li>B</li></ul>";

pub fn user(id: i64, plan: i64, credits: i32) -> UserAccount {
    UserAccount {
        id: UserId::new(id).expect("user id"),
        name: format!("Student {id}"),
        document_credits: credits,
        current_plan_id: PlanId::new(plan).expect("plan id"),
        subscription_end: None,
    }
}

pub fn draft(id: i64, owner: i64) -> Document {
    let now = Utc::now();
    Document {
        id: DocumentId::new(id).expect("document id"),
        user_id: UserId::new(owner).expect("user id"),
        title: format!("Assignment {id}"),
        content: CONTENT.to_owned(),
        status: DocumentStatus::Draft,
        created_at: now,
        updated_at: now,
    }
}

/// Store holding the default plans plus whatever `seed` adds.
pub fn store(seed: impl FnOnce(&mut StoreState)) -> Arc<InMemoryStore> {
    let mut state = StoreState::with_plans(default_plans());
    seed(&mut state);
    Arc::new(InMemoryStore::new(state))
}

fn http_state(store: &Arc<InMemoryStore>, clock: Arc<dyn Clock>) -> web::Data<HttpState> {
    let documents = Arc::new(DocumentService::new(
        store.clone(),
        store.clone(),
        clock.clone(),
    ));
    let billing = Arc::new(BillingService::new(store.clone(), clock.clone()));
    let exports = DocumentExportService::new(store.clone(), default_encoders(), clock);
    web::Data::new(HttpState::new(HttpStatePorts {
        exports: Arc::new(exports),
        documents: documents.clone(),
        documents_query: documents,
        billing: billing.clone(),
        plans: billing,
    }))
}

async fn login_shim(session: SessionContext, path: web::Path<i64>) -> Result<HttpResponse, Error> {
    let user_id =
        UserId::new(path.into_inner()).map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(user_id)?;
    Ok(HttpResponse::NoContent().finish())
}

/// Clock pinned to a settable instant.
pub struct FixtureClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixtureClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().expect("clock lock") = now;
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Full app as served, plus a route standing in for the external login.
pub fn app_for(
    store: &Arc<InMemoryStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    app_with_clock(store, Arc::new(DefaultClock))
}

/// [`app_for`] with the services reading time from `clock`.
pub fn app_with_clock(
    store: &Arc<InMemoryStore>,
    clock: Arc<dyn Clock>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    App::new()
        .app_data(health)
        .app_data(http_state(store, clock))
        .wrap(
            SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                .cookie_name("session".to_owned())
                .cookie_secure(false)
                .build(),
        )
        .wrap(Trace)
        .route("/test/login/{user_id}", web::get().to(login_shim))
        .configure(configure)
}

pub fn session_cookie(response: &ServiceResponse) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

pub async fn login<S>(app: &S, user_id: i64) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!("/test/login/{user_id}"))
            .to_request(),
    )
    .await;
    assert!(response.status().is_success(), "login shim failed");
    session_cookie(&response).expect("session cookie")
}

pub async fn get<S>(app: &S, uri: &str, cookie: &Cookie<'static>) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    test::call_service(
        app,
        test::TestRequest::get()
            .uri(uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await
}
