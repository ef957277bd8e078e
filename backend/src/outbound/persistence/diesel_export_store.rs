//! PostgreSQL-backed `ExportStore`.
//!
//! The commit locks the user row, re-checks ownership and the daily cap,
//! applies a guarded credit update and flips the document status inside one
//! transaction. Any failure rolls all of it back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{ExportCommit, ExportReceipt, ExportStore, ExportStoreError};
use crate::domain::{Document, DocumentId, DocumentStatus, Plan, PlanId, UserAccount, UserId};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{DocumentRow, PlanRow, StatusUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{documents, plans, users};

fn map_pool_error(error: PoolError) -> ExportStoreError {
    map_basic_pool_error(error, ExportStoreError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ExportStoreError {
    map_basic_diesel_error(error, ExportStoreError::query, ExportStoreError::connection)
}

/// Failure inside the commit transaction.
#[derive(Debug)]
enum CommitFailure {
    Database(diesel::result::Error),
    Refused(ExportStoreError),
}

impl From<diesel::result::Error> for CommitFailure {
    fn from(value: diesel::result::Error) -> Self {
        Self::Database(value)
    }
}

impl From<CommitFailure> for ExportStoreError {
    fn from(value: CommitFailure) -> Self {
        match value {
            CommitFailure::Database(error) => map_diesel_error(error),
            CommitFailure::Refused(error) => error,
        }
    }
}

async fn exported_since(
    conn: &mut AsyncPgConnection,
    user_id: i64,
    day_start: DateTime<Utc>,
) -> Result<i64, diesel::result::Error> {
    documents::table
        .filter(
            documents::user_id
                .eq(user_id)
                .and(documents::status.eq(DocumentStatus::Exported.as_str()))
                .and(documents::updated_at.ge(day_start)),
        )
        .count()
        .get_result(conn)
        .await
}

/// Diesel-backed implementation of the `ExportStore` port.
#[derive(Clone)]
pub struct DieselExportStore {
    pool: DbPool,
}

impl DieselExportStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExportStore for DieselExportStore {
    async fn get_user(&self, user_id: UserId) -> Result<Option<UserAccount>, ExportStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(user_id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(UserAccount::try_from)
            .transpose()
            .map_err(ExportStoreError::query)
    }

    async fn get_plan(&self, plan_id: PlanId) -> Result<Option<Plan>, ExportStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = plans::table
            .find(plan_id.get())
            .select(PlanRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(Plan::try_from)
            .transpose()
            .map_err(ExportStoreError::query)
    }

    async fn get_document(
        &self,
        document_id: DocumentId,
        user_id: UserId,
    ) -> Result<Option<Document>, ExportStoreError> {
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
        row.map(Document::try_from)
            .transpose()
            .map_err(ExportStoreError::query)
    }

    async fn count_exported_today(
        &self,
        user_id: UserId,
        day_start: DateTime<Utc>,
    ) -> Result<u32, ExportStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let count = exported_since(&mut conn, user_id.get(), day_start)
            .await
            .map_err(map_diesel_error)?;
        u32::try_from(count).map_err(|error| ExportStoreError::query(error.to_string()))
    }

    async fn apply_export(&self, commit: &ExportCommit) -> Result<ExportReceipt, ExportStoreError> {
        let commit = *commit;
        let user_id = commit.user_id.get();
        let document_id = commit.document_id.get();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let remaining_credits = conn
            .transaction::<i32, CommitFailure, _>(|conn| {
                async move {
                    let balance: Option<i32> = users::table
                        .find(user_id)
                        .select(users::document_credits)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let owned: Option<i64> = documents::table
                        .filter(documents::id.eq(document_id).and(documents::user_id.eq(user_id)))
                        .select(documents::id)
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let (Some(balance), Some(_)) = (balance, owned) else {
                        return Err(CommitFailure::Refused(ExportStoreError::document_missing()));
                    };

                    if let Some(cap) = commit.daily_cap {
                        let today = exported_since(conn, user_id, cap.day_start).await?;
                        if today >= i64::from(cap.limit) {
                            return Err(CommitFailure::Refused(
                                ExportStoreError::daily_limit_reached(cap.limit),
                            ));
                        }
                    }

                    let remaining = if commit.credit_delta == 0 {
                        balance
                    } else {
                        diesel::update(
                            users::table.filter(
                                users::id
                                    .eq(user_id)
                                    .and(users::document_credits.ge(-commit.credit_delta.min(0))),
                            ),
                        )
                        .set(users::document_credits.eq(users::document_credits + commit.credit_delta))
                        .returning(users::document_credits)
                        .get_result(conn)
                        .await
                        .optional()?
                        .ok_or(CommitFailure::Refused(ExportStoreError::credits_exhausted()))?
                    };

                    diesel::update(documents::table.find(document_id))
                        .set(StatusUpdate {
                            status: DocumentStatus::Exported.as_str(),
                            updated_at: commit.exported_at,
                        })
                        .execute(conn)
                        .await?;
                    Ok(remaining)
                }
                .scope_boxed()
            })
            .await?;

        Ok(ExportReceipt { remaining_credits })
    }
}
