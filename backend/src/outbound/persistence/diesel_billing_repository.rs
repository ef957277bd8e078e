//! PostgreSQL-backed `BillingRepository`.
//!
//! A purchase inserts a pending transaction, applies its effect to the user
//! and completes the transaction with its reference, all in one database
//! transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    BillingRepository, BillingRepositoryError, PurchaseCommit, PurchaseEffect, PurchaseReceipt,
};
use crate::domain::{Plan, PlanId, TransactionId, UserAccount, UserId, payment_reference};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewTransactionRow, PlanRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{plans, transactions, users};

const PENDING: &str = "pending";
const COMPLETED: &str = "completed";

fn map_pool_error(error: PoolError) -> BillingRepositoryError {
    map_basic_pool_error(error, BillingRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> BillingRepositoryError {
    map_basic_diesel_error(
        error,
        BillingRepositoryError::query,
        BillingRepositoryError::connection,
    )
}

#[derive(Debug)]
enum PurchaseFailure {
    Database(diesel::result::Error),
    Refused(BillingRepositoryError),
}

impl From<diesel::result::Error> for PurchaseFailure {
    fn from(value: diesel::result::Error) -> Self {
        Self::Database(value)
    }
}

impl From<PurchaseFailure> for BillingRepositoryError {
    fn from(value: PurchaseFailure) -> Self {
        match value {
            PurchaseFailure::Database(error) => map_diesel_error(error),
            PurchaseFailure::Refused(error) => error,
        }
    }
}

/// Diesel-backed implementation of the `BillingRepository` port.
#[derive(Clone)]
pub struct DieselBillingRepository {
    pool: DbPool,
}

impl DieselBillingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillingRepository for DieselBillingRepository {
    async fn list_plans(&self) -> Result<Vec<Plan>, BillingRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PlanRow> = plans::table
            .order(plans::id.asc())
            .select(PlanRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter()
            .map(|row| Plan::try_from(row).map_err(BillingRepositoryError::query))
            .collect()
    }

    async fn find_plan(&self, plan_id: PlanId) -> Result<Option<Plan>, BillingRepositoryError> {
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
            .map_err(BillingRepositoryError::query)
    }

    async fn find_account(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserAccount>, BillingRepositoryError> {
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
            .map_err(BillingRepositoryError::query)
    }

    async fn apply_purchase(
        &self,
        commit: &PurchaseCommit,
    ) -> Result<PurchaseReceipt, BillingRepositoryError> {
        let commit = commit.clone();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let receipt = conn
            .transaction::<PurchaseReceipt, PurchaseFailure, _>(|conn| {
                async move {
                    let user_id = commit.user_id.get();
                    let raw_id: i64 = diesel::insert_into(transactions::table)
                        .values(NewTransactionRow {
                            user_id,
                            plan_id: commit.plan_id.get(),
                            amount_minor: commit.amount_minor,
                            currency: &commit.currency,
                            status: PENDING,
                        })
                        .returning(transactions::id)
                        .get_result(conn)
                        .await?;

                    let updated = match commit.effect {
                        PurchaseEffect::AddCredits(quantity) => {
                            let quantity = i32::try_from(quantity).map_err(|_| {
                                PurchaseFailure::Refused(BillingRepositoryError::query(
                                    "credit quantity out of range",
                                ))
                            })?;
                            diesel::update(users::table.find(user_id))
                                .set(users::document_credits.eq(users::document_credits + quantity))
                                .execute(conn)
                                .await?
                        }
                        PurchaseEffect::Subscribe { plan_id, until } => {
                            diesel::update(users::table.find(user_id))
                                .set((
                                    users::current_plan_id.eq(plan_id.get()),
                                    users::subscription_end.eq(Some(until)),
                                ))
                                .execute(conn)
                                .await?
                        }
                    };
                    if updated == 0 {
                        return Err(PurchaseFailure::Refused(
                            BillingRepositoryError::account_missing(),
                        ));
                    }

                    let transaction_id = TransactionId::new(raw_id).map_err(|error| {
                        PurchaseFailure::Refused(BillingRepositoryError::query(error.to_string()))
                    })?;
                    let reference = payment_reference(transaction_id);
                    diesel::update(transactions::table.find(raw_id))
                        .set((
                            transactions::status.eq(COMPLETED),
                            transactions::payment_reference.eq(Some(reference.as_str())),
                        ))
                        .execute(conn)
                        .await?;
                    Ok(PurchaseReceipt {
                        transaction_id,
                        reference,
                    })
                }
                .scope_boxed()
            })
            .await?;
        Ok(receipt)
    }
}
