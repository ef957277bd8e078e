//! Export download handlers.
//!
//! ```text
//! GET /export/{document_id}?type=pdf|docx
//! GET /api/v1/documents/{document_id}/export?type=pdf|docx
//! ```
//!
//! Both paths run the same pipeline. They differ only in how a quota denial
//! reaches the client: the browser path redirects back to the editor with a
//! flash notice, the API path answers `402 Payment Required`.

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use tracing::debug;
use utoipa::IntoParams;

use crate::domain::export::{ExportError, ExportedFile};
use crate::domain::ports::ExportRequest;
use crate::domain::{DocumentId, Error, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::private_no_cache;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

const DEFAULT_EXPORT_TYPE: &str = "pdf";

/// Query string accepted by both export paths.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// `pdf` (default) or `docx`.
    #[serde(rename = "type")]
    #[param(rename = "type", example = "pdf")]
    pub format: Option<String>,
}

/// Parse a path id, treating non-positive values as unknown documents.
pub(crate) fn parse_document_id(raw: i64) -> Result<DocumentId, Error> {
    DocumentId::new(raw).map_err(|_| Error::not_found("document not found"))
}

fn export_request(user_id: UserId, document_id: DocumentId, query: ExportQuery) -> ExportRequest {
    ExportRequest {
        user_id,
        document_id,
        format: query
            .format
            .unwrap_or_else(|| DEFAULT_EXPORT_TYPE.to_owned()),
    }
}

fn attachment(file: ExportedFile) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(file.format.content_type())
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(file.filename)],
        })
        .insert_header(private_no_cache())
        .body(file.bytes)
}

/// Browser download of an owned document.
///
/// A quota denial queues a notice and redirects to `/editor/{document_id}`.
#[utoipa::path(
    get,
    path = "/export/{document_id}",
    params(("document_id" = i64, Path, description = "Document to export"), ExportQuery),
    responses(
        (status = 200, description = "Encoded document", content_type = "application/octet-stream"),
        (status = 303, description = "Quota denied; redirected to the editor", headers(("Location" = String))),
        (status = 400, description = "Unsupported export type", body = crate::domain::ErrorResponse),
        (status = 401, description = "Unauthorised", body = crate::domain::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::domain::ErrorResponse),
        (status = 500, description = "Export failed", body = crate::domain::ErrorResponse)
    ),
    tags = ["exports"],
    operation_id = "downloadExport"
)]
#[get("/export/{document_id}")]
pub async fn browser_export(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    query: web::Query<ExportQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let document_id = parse_document_id(path.into_inner())?;
    let request = export_request(user_id, document_id, query.into_inner());
    match state.exports.export(request).await {
        Ok(file) => Ok(attachment(file)),
        Err(ExportError::QuotaExceeded(denial)) => {
            debug!(%document_id, reason = denial.reason(), "redirecting denied export to editor");
            session.push_notice(denial.notice())?;
            Ok(HttpResponse::SeeOther()
                .insert_header((header::LOCATION, format!("/editor/{document_id}")))
                .finish())
        }
        Err(err) => Err(err.into()),
    }
}

/// API download of an owned document.
#[utoipa::path(
    get,
    path = "/api/v1/documents/{document_id}/export",
    params(("document_id" = i64, Path, description = "Document to export"), ExportQuery),
    responses(
        (status = 200, description = "Encoded document", content_type = "application/octet-stream"),
        (status = 400, description = "Unsupported export type", body = crate::domain::ErrorResponse),
        (status = 401, description = "Unauthorised", body = crate::domain::ErrorResponse),
        (status = 402, description = "Quota denied", body = crate::domain::ErrorResponse),
        (status = 404, description = "Document not found", body = crate::domain::ErrorResponse),
        (status = 500, description = "Export failed", body = crate::domain::ErrorResponse)
    ),
    tags = ["exports"],
    operation_id = "exportDocument"
)]
#[get("/documents/{document_id}/export")]
pub async fn api_export(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<i64>,
    query: web::Query<ExportQuery>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let document_id = parse_document_id(path.into_inner())?;
    let file = state
        .exports
        .export(export_request(user_id, document_id, query.into_inner()))
        .await?;
    Ok(attachment(file))
}

#[cfg(test)]
#[path = "exports_tests.rs"]
mod tests;
