//! HTTP inbound adapter exposing the browser download path and the REST API.

pub mod billing;
pub mod cache_control;
pub mod documents;
pub mod error;
pub mod exports;
pub mod health;
pub mod notices;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

/// Malformed bodies and query strings answer with the error envelope.
fn extractor_configs() -> (web::JsonConfig, web::QueryConfig) {
    let json = web::JsonConfig::default()
        .error_handler(|err, _| Error::invalid_request(format!("invalid JSON body: {err}")).into());
    let query = web::QueryConfig::default()
        .error_handler(|err, _| Error::invalid_request(format!("invalid query: {err}")).into());
    (json, query)
}

/// Register every route.
///
/// Expects [`state::HttpState`] and [`health::HealthState`] as app data and a
/// session middleware wrapping the app.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use assignment_formatter::inbound::http::configure;
///
/// let _app = App::new().configure(configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    let (json, query) = extractor_configs();
    cfg.app_data(json)
        .app_data(query)
        .service(health::ready)
        .service(health::live)
        .service(exports::browser_export)
        .service(
            web::scope("/api/v1")
                .service(documents::save_draft)
                .service(documents::preview)
                .service(documents::submit_document)
                .service(exports::api_export)
                .service(documents::get_document)
                .service(documents::list_documents)
                .service(billing::list_plans)
                .service(billing::create_payment)
                .service(notices::list_notices),
        );
}
