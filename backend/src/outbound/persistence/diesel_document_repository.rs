//! PostgreSQL-backed `DocumentRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{DocumentRepository, DocumentRepositoryError, DraftContent};
use crate::domain::{Document, DocumentId, DocumentStatus, DocumentSummary, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{DocumentRow, DocumentSummaryRow, DraftUpdate, NewDocumentRow, StatusUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::documents;

fn map_pool_error(error: PoolError) -> DocumentRepositoryError {
    map_basic_pool_error(error, DocumentRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> DocumentRepositoryError {
    map_basic_diesel_error(
        error,
        DocumentRepositoryError::query,
        DocumentRepositoryError::connection,
    )
}

fn to_document(row: DocumentRow) -> Result<Document, DocumentRepositoryError> {
    Document::try_from(row).map_err(DocumentRepositoryError::query)
}

/// Diesel-backed implementation of the `DocumentRepository` port.
#[derive(Clone)]
pub struct DieselDocumentRepository {
    pool: DbPool,
}

impl DieselDocumentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentRepository for DieselDocumentRepository {
    async fn create_draft(
        &self,
        user_id: UserId,
        draft: &DraftContent,
        at: DateTime<Utc>,
    ) -> Result<Document, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(documents::table)
            .values(NewDocumentRow {
                user_id: user_id.get(),
                title: &draft.title,
                content: &draft.content,
                status: DocumentStatus::Draft.as_str(),
                created_at: at,
                updated_at: at,
            })
            .returning(DocumentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        to_document(row)
    }

    async fn update_draft(
        &self,
        document_id: DocumentId,
        user_id: UserId,
        draft: &DraftContent,
        at: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(
            documents::table.filter(
                documents::id
                    .eq(document_id.get())
                    .and(documents::user_id.eq(user_id.get())),
            ),
        )
        .set(DraftUpdate {
            title: &draft.title,
            content: &draft.content,
            updated_at: at,
        })
        .returning(DocumentRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        row.map(to_document).transpose()
    }

    async fn mark_submitted(
        &self,
        document_id: DocumentId,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::update(
            documents::table.filter(
                documents::id
                    .eq(document_id.get())
                    .and(documents::user_id.eq(user_id.get())),
            ),
        )
        .set(StatusUpdate {
            status: DocumentStatus::Submitted.as_str(),
            updated_at: at,
        })
        .returning(DocumentRow::as_returning())
        .get_result(&mut conn)
        .await
        .optional()
        .map_err(map_diesel_error)?;
        row.map(to_document).transpose()
    }

    async fn find(
        &self,
        document_id: DocumentId,
        user_id: UserId,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = documents::table
            .filter(
                documents::id
                    .eq(document_id.get())
                    .and(documents::user_id.eq(user_id.get())),
            )
            .select(DocumentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_document).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<DocumentSummary>, DocumentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<DocumentSummaryRow> = documents::table
            .filter(documents::user_id.eq(user_id.get()))
            .order((documents::updated_at.desc(), documents::id.desc()))
            .select(DocumentSummaryRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| DocumentSummary::try_from(row).map_err(DocumentRepositoryError::query))
            .collect()
    }
}
