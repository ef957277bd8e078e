//! Port for the reads and the single transactional write of an export.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Document, DocumentId, Plan, PlanId, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by export store adapters.
    pub enum ExportStoreError {
        /// Store connection could not be established.
        Connection { message: String } => "export store connection failed: {message}",
        /// Query or mutation failed during execution; the transaction rolled back.
        Query { message: String } => "export store query failed: {message}",
        /// The document disappeared or changed owner before the commit.
        DocumentMissing => "document no longer exists for this user",
        /// The credit guard failed at commit time.
        CreditsExhausted => "document credits exhausted",
        /// The daily cap was reached by a concurrent export.
        DailyLimitReached { limit: u32 } => "daily export limit of {limit} reached",
    }
}

/// Re-check of the daily cap performed inside the commit transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCap {
    pub limit: u32,
    pub day_start: DateTime<Utc>,
}

/// Everything the commit needs to apply atomically.
///
/// A negative `credit_delta` is only applied while the stored balance covers
/// it; otherwise the commit fails with
/// [`ExportStoreError::CreditsExhausted`] and nothing changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportCommit {
    pub document_id: DocumentId,
    pub user_id: UserId,
    pub credit_delta: i32,
    pub daily_cap: Option<DailyCap>,
    /// Written to the document's `updated_at`.
    pub exported_at: DateTime<Utc>,
}

/// Result of a successful commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReceipt {
    pub remaining_credits: i32,
}

/// Store access used by the export orchestrator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExportStore: Send + Sync {
    /// Load the account of the authenticated user.
    async fn get_user(&self, user_id: UserId) -> Result<Option<UserAccount>, ExportStoreError>;

    /// Load a plan by id.
    async fn get_plan(&self, plan_id: PlanId) -> Result<Option<Plan>, ExportStoreError>;

    /// Load a document owned by `user_id`.
    async fn get_document(
        &self,
        document_id: DocumentId,
        user_id: UserId,
    ) -> Result<Option<Document>, ExportStoreError>;

    /// Count the user's documents in `exported` status updated at or after
    /// `day_start`.
    async fn count_exported_today(
        &self,
        user_id: UserId,
        day_start: DateTime<Utc>,
    ) -> Result<u32, ExportStoreError>;

    /// Apply the credit change and mark the document exported in one
    /// transaction. Either both happen or neither does.
    async fn apply_export(&self, commit: &ExportCommit) -> Result<ExportReceipt, ExportStoreError>;
}

/// Fixture implementation for tests that never reach the store.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureExportStore;

#[async_trait]
impl ExportStore for FixtureExportStore {
    async fn get_user(&self, _user_id: UserId) -> Result<Option<UserAccount>, ExportStoreError> {
        Ok(None)
    }

    async fn get_plan(&self, _plan_id: PlanId) -> Result<Option<Plan>, ExportStoreError> {
        Ok(None)
    }

    async fn get_document(
        &self,
        _document_id: DocumentId,
        _user_id: UserId,
    ) -> Result<Option<Document>, ExportStoreError> {
        Ok(None)
    }

    async fn count_exported_today(
        &self,
        _user_id: UserId,
        _day_start: DateTime<Utc>,
    ) -> Result<u32, ExportStoreError> {
        Ok(0)
    }

    async fn apply_export(&self, _commit: &ExportCommit) -> Result<ExportReceipt, ExportStoreError> {
        Err(ExportStoreError::document_missing())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_resolves_nothing() {
        let store = FixtureExportStore;
        let user_id = UserId::new(1).expect("valid id");
        assert!(store.get_user(user_id).await.expect("lookup").is_none());
        assert_eq!(
            store
                .count_exported_today(user_id, Utc::now())
                .await
                .expect("count"),
            0
        );
    }

    #[rstest]
    fn errors_render_their_context() {
        assert_eq!(
            ExportStoreError::daily_limit_reached(3_u32).to_string(),
            "daily export limit of 3 reached"
        );
        assert_eq!(
            ExportStoreError::query("deadlock").to_string(),
            "export store query failed: deadlock"
        );
    }
}
