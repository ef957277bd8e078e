//! Driving port for authoring documents.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Document, DocumentId, Error, UserId};

/// Create a draft, or overwrite an owned document when `document_id` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    pub user_id: UserId,
    pub document_id: Option<DocumentId>,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftResponse {
    pub document_id: DocumentId,
    /// Whether a new document was created.
    pub created: bool,
}

/// Driving port for document writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentCommand: Send + Sync {
    /// Save a draft.
    ///
    /// # Errors
    ///
    /// Returns `not_found` when `document_id` names a document the user does
    /// not own.
    async fn save_draft(&self, request: SaveDraftRequest) -> Result<SaveDraftResponse, Error>;

    /// Mark an owned document as submitted.
    async fn submit(&self, user_id: UserId, document_id: DocumentId) -> Result<Document, Error>;
}
