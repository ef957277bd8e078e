//! Driving port for reading documents and the dashboard.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Document, DocumentId, DocumentSummary, Error, Plan, UserId};

/// Everything the dashboard shows for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub documents: Vec<DocumentSummary>,
    pub plan: Plan,
    pub document_credits: i32,
    pub subscription_end: Option<DateTime<Utc>>,
}

/// Driving port for document reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentQuery: Send + Sync {
    /// Fetch an owned document.
    async fn get(&self, user_id: UserId, document_id: DocumentId) -> Result<Document, Error>;

    /// Document listing plus plan summary and credits.
    async fn dashboard(&self, user_id: UserId) -> Result<Dashboard, Error>;
}
