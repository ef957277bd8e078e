//! Driving port for exporting a document.
//!
//! Inbound adapters pass the raw `type` parameter through untouched; the
//! implementation validates it after the quota check and before any mutation,
//! so an unsupported type never consumes a credit.

use async_trait::async_trait;

use crate::domain::export::{ExportError, ExportedFile};
use crate::domain::{DocumentId, UserId};

/// Export of one document owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub user_id: UserId,
    pub document_id: DocumentId,
    /// Requested output format as supplied by the client.
    pub format: String,
}

/// Driving port for document exports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentExportCommand: Send + Sync {
    /// Run the export pipeline and return the encoded file.
    ///
    /// # Errors
    ///
    /// - [`ExportError::NotFound`] when the user, plan or document is missing.
    /// - [`ExportError::QuotaExceeded`] when the plan refuses the export.
    /// - [`ExportError::UnsupportedFormat`] for any type other than pdf/docx.
    /// - Encoding and persistence failures otherwise; the store is unchanged.
    async fn export(&self, request: ExportRequest) -> Result<ExportedFile, ExportError>;
}
