//! Document authoring and dashboard services.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::ports::{
    BillingRepository, BillingRepositoryError, Dashboard, DocumentCommand, DocumentQuery,
    DocumentRepository, DocumentRepositoryError, DraftContent, SaveDraftRequest,
    SaveDraftResponse,
};
use crate::domain::{Document, DocumentId, Error, UserId, truncate_title};

/// Document service implementing the authoring driving ports.
#[derive(Clone)]
pub struct DocumentService<R, B> {
    documents: Arc<R>,
    billing: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<R, B> DocumentService<R, B> {
    pub fn new(documents: Arc<R>, billing: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self {
            documents,
            billing,
            clock,
        }
    }
}

fn document_not_found() -> Error {
    Error::not_found("Document not found or unauthorized")
}

impl<R, B> DocumentService<R, B>
where
    R: DocumentRepository,
    B: BillingRepository,
{
    fn map_document_error(error: DocumentRepositoryError) -> Error {
        match error {
            DocumentRepositoryError::Connection { message } => {
                Error::internal(format!("document repository unavailable: {message}"))
            }
            DocumentRepositoryError::Query { message } => {
                Error::internal(format!("document repository error: {message}"))
            }
        }
    }

    fn map_billing_error(error: BillingRepositoryError) -> Error {
        match error {
            BillingRepositoryError::Connection { message } => {
                Error::internal(format!("billing repository unavailable: {message}"))
            }
            BillingRepositoryError::AccountMissing => Error::not_found("account not found"),
            BillingRepositoryError::Query { message } => {
                Error::internal(format!("billing repository error: {message}"))
            }
        }
    }
}

#[async_trait]
impl<R, B> DocumentCommand for DocumentService<R, B>
where
    R: DocumentRepository,
    B: BillingRepository,
{
    async fn save_draft(&self, request: SaveDraftRequest) -> Result<SaveDraftResponse, Error> {
        let draft = DraftContent {
            title: truncate_title(&request.title),
            content: request.content,
        };
        let now = self.clock.utc();
        match request.document_id {
            Some(document_id) => {
                let document = self
                    .documents
                    .update_draft(document_id, request.user_id, &draft, now)
                    .await
                    .map_err(Self::map_document_error)?
                    .ok_or_else(document_not_found)?;
                Ok(SaveDraftResponse {
                    document_id: document.id,
                    created: false,
                })
            }
            None => {
                let document = self
                    .documents
                    .create_draft(request.user_id, &draft, now)
                    .await
                    .map_err(Self::map_document_error)?;
                tracing::debug!(document_id = %document.id, "draft created");
                Ok(SaveDraftResponse {
                    document_id: document.id,
                    created: true,
                })
            }
        }
    }

    async fn submit(&self, user_id: UserId, document_id: DocumentId) -> Result<Document, Error> {
        self.documents
            .mark_submitted(document_id, user_id, self.clock.utc())
            .await
            .map_err(Self::map_document_error)?
            .ok_or_else(document_not_found)
    }
}

#[async_trait]
impl<R, B> DocumentQuery for DocumentService<R, B>
where
    R: DocumentRepository,
    B: BillingRepository,
{
    async fn get(&self, user_id: UserId, document_id: DocumentId) -> Result<Document, Error> {
        self.documents
            .find(document_id, user_id)
            .await
            .map_err(Self::map_document_error)?
            .ok_or_else(document_not_found)
    }

    async fn dashboard(&self, user_id: UserId) -> Result<Dashboard, Error> {
        let account = self
            .billing
            .find_account(user_id)
            .await
            .map_err(Self::map_billing_error)?
            .ok_or_else(|| Error::not_found("account not found"))?;
        let plan = self
            .billing
            .find_plan(account.current_plan_id)
            .await
            .map_err(Self::map_billing_error)?
            .ok_or_else(|| Error::not_found("plan not found"))?;
        let documents = self
            .documents
            .list_for_user(user_id)
            .await
            .map_err(Self::map_document_error)?;
        Ok(Dashboard {
            documents,
            plan,
            document_credits: account.document_credits,
            subscription_end: account.subscription_end,
        })
    }
}

#[cfg(test)]
#[path = "document_service_tests.rs"]
mod tests;
