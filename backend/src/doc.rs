//! OpenAPI documentation.
//!
//! [`ApiDoc`] aggregates every inbound handler and the wire schemas. Swagger
//! UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{Dashboard, PurchaseResponse};
use crate::domain::{
    Document, DocumentStatus, DocumentSummary, ErrorCode, ErrorResponse, Plan, PlanType,
};
use crate::inbound::http::billing::PaymentRequest;
use crate::inbound::http::documents::{DocumentAck, DraftRequest, PreviewRequest, PreviewResponse};
use crate::inbound::http::notices::NoticesResponse;

/// Registers the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Signed session cookie issued by the login service.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Assignment formatter API",
        description = "Draft, preview and export assignments under plan quotas."
    ),
    servers((url = "/", description = "Relative to the deployment base URL")),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::exports::browser_export,
        crate::inbound::http::exports::api_export,
        crate::inbound::http::documents::save_draft,
        crate::inbound::http::documents::preview,
        crate::inbound::http::documents::submit_document,
        crate::inbound::http::documents::get_document,
        crate::inbound::http::documents::list_documents,
        crate::inbound::http::billing::list_plans,
        crate::inbound::http::billing::create_payment,
        crate::inbound::http::notices::list_notices,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorResponse,
        ErrorCode,
        Document,
        DocumentStatus,
        DocumentSummary,
        Dashboard,
        Plan,
        PlanType,
        PurchaseResponse,
        PaymentRequest,
        DraftRequest,
        DocumentAck,
        PreviewRequest,
        PreviewResponse,
        NoticesResponse,
    )),
    tags(
        (name = "exports", description = "PDF and DOCX downloads"),
        (name = "documents", description = "Drafts, submission and preview"),
        (name = "billing", description = "Plans and simulated payments"),
        (name = "notices", description = "Flash notices"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
