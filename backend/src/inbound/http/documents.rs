//! Document authoring handlers.
//!
//! ```text
//! POST /api/v1/documents/drafts {"documentId":1,"title":"Essay","content":"<p>..</p>"}
//! POST /api/v1/documents/preview {"text":"Introduction\n..","detect":true}
//! POST /api/v1/documents/{document_id}/submit
//! GET  /api/v1/documents/{document_id}
//! GET  /api/v1/documents
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{Dashboard, SaveDraftRequest};
use crate::domain::preview::preview_html;
use crate::domain::{Document, DocumentId, ErrorResponse};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache;
use crate::inbound::http::exports::parse_document_id;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_id_field;

/// Draft payload. Omit `documentId` to create a new draft.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    #[schema(example = 12)]
    pub document_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Acknowledgement naming the affected document.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAck {
    pub ok: bool,
    pub document_id: DocumentId,
}

impl DocumentAck {
    fn new(document_id: DocumentId) -> Self {
        Self {
            ok: true,
            document_id,
        }
    }
}

/// Plain text to preview.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PreviewRequest {
    #[serde(default)]
    pub text: String,
    /// Promote heading-like lines to sections. Defaults to `true`.
    #[serde(default = "detect_default")]
    pub detect: bool,
}

const fn detect_default() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PreviewResponse {
    pub html: String,
}

/// Create a draft or overwrite an owned document.
#[utoipa::path(
    post,
    path = "/api/v1/documents/drafts",
    request_body = DraftRequest,
    responses(
        (status = 200, description = "Draft saved", body = DocumentAck),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorised", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    tags = ["documents"],
    operation_id = "saveDraft"
)]
#[post("/documents/drafts")]
pub async fn save_draft(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<DraftRequest>,
) -> ApiResult<web::Json<DocumentAck>> {
    let user_id = session.require_user_id()?;
    let DraftRequest {
        document_id,
        title,
        content,
    } = payload.into_inner();
    let document_id = document_id
        .map(|raw| parse_id_field(raw, "documentId"))
        .transpose()?;
    let saved = state
        .documents
        .save_draft(SaveDraftRequest {
            user_id,
            document_id,
            title,
            content,
        })
        .await?;
    Ok(web::Json(DocumentAck::new(saved.document_id)))
}

/// Render plain text as a print-styled preview page.
#[utoipa::path(
    post,
    path = "/api/v1/documents/preview",
    request_body = PreviewRequest,
    responses((status = 200, description = "Preview page", body = PreviewResponse)),
    tags = ["documents"],
    operation_id = "previewDocument",
    security([])
)]
#[post("/documents/preview")]
pub async fn preview(payload: web::Json<PreviewRequest>) -> web::Json<PreviewResponse> {
    let PreviewRequest { text, detect } = payload.into_inner();
    web::Json(PreviewResponse {
        html: preview_html(&text, detect),
    })
}

/// Mark an owned document as submitted.
#[utoipa::path(
    post,
    path = "/api/v1/documents/{document_id}/submit",
    params(("document_id" = i64, Path)),
    responses(
        (status = 200, description = "Submitted", body = DocumentAck),
        (status = 401, description = "Unauthorised", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    tags = ["documents"],
    operation_id = "submitDocument"
)]
#[post("/documents/{document_id}/submit")]
pub async fn submit_document(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<web::Json<DocumentAck>> {
    let user_id = session.require_user_id()?;
    let document_id = parse_document_id(path.into_inner())?;
    let document = state.documents.submit(user_id, document_id).await?;
    Ok(web::Json(DocumentAck::new(document.id)))
}

/// Fetch an owned document.
#[utoipa::path(
    get,
    path = "/api/v1/documents/{document_id}",
    params(("document_id" = i64, Path)),
    responses(
        (status = 200, description = "Document", body = Document),
        (status = 401, description = "Unauthorised", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    tags = ["documents"],
    operation_id = "getDocument"
)]
#[get("/documents/{document_id}")]
pub async fn get_document(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let document_id = parse_document_id(path.into_inner())?;
    let document = state.documents_query.get(user_id, document_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache())
        .json(document))
}

/// Dashboard: owned documents, newest first, with plan and credits.
#[utoipa::path(
    get,
    path = "/api/v1/documents",
    responses(
        (status = 200, description = "Dashboard", body = Dashboard),
        (status = 401, description = "Unauthorised", body = ErrorResponse)
    ),
    tags = ["documents"],
    operation_id = "listDocuments"
)]
#[get("/documents")]
pub async fn list_documents(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let dashboard = state.documents_query.dashboard(user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_cache())
        .json(dashboard))
}

#[cfg(test)]
#[path = "documents_tests.rs"]
mod tests;
