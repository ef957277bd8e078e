//! Port for document persistence outside the export commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Document, DocumentId, DocumentSummary, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by document repository adapters.
    pub enum DocumentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "document repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "document repository query failed: {message}",
    }
}

/// Title and body written by a draft save. The title is already truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftContent {
    pub title: String,
    pub content: String,
}

/// Document storage scoped to the owning user.
///
/// Every lookup and mutation filters on `user_id`; a document owned by
/// someone else behaves exactly like a missing one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a new document in `draft` status.
    async fn create_draft(
        &self,
        user_id: UserId,
        draft: &DraftContent,
        at: DateTime<Utc>,
    ) -> Result<Document, DocumentRepositoryError>;

    /// Overwrite title and content of an owned document.
    async fn update_draft(
        &self,
        document_id: DocumentId,
        user_id: UserId,
        draft: &DraftContent,
        at: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentRepositoryError>;

    /// Move an owned document to `submitted`.
    async fn mark_submitted(
        &self,
        document_id: DocumentId,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentRepositoryError>;

    async fn find(
        &self,
        document_id: DocumentId,
        user_id: UserId,
    ) -> Result<Option<Document>, DocumentRepositoryError>;

    /// Summaries of the user's documents, most recently updated first.
    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<DocumentSummary>, DocumentRepositoryError>;
}
