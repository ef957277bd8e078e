//! Port for plan reference data, account lookups and simulated purchases.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Plan, PlanId, TransactionId, UserAccount, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by billing repository adapters.
    pub enum BillingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "billing repository connection failed: {message}",
        /// Query or mutation failed during execution; the transaction rolled back.
        Query { message: String } => "billing repository query failed: {message}",
        /// The purchasing account vanished mid-transaction.
        AccountMissing => "account not found",
    }
}

/// Account change applied when a purchase completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseEffect {
    /// Add pay-per-document credits to the balance.
    AddCredits(u32),
    /// Move the account onto a subscription plan until `until`.
    Subscribe { plan_id: PlanId, until: DateTime<Utc> },
}

/// A purchase to record and apply in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseCommit {
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub amount_minor: i64,
    pub currency: String,
    pub effect: PurchaseEffect,
}

/// Completed transaction record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    pub transaction_id: TransactionId,
    /// Payment reference stored on the completed transaction.
    pub reference: String,
}

/// Billing storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingRepository: Send + Sync {
    /// All plans ordered by id.
    async fn list_plans(&self) -> Result<Vec<Plan>, BillingRepositoryError>;

    async fn find_plan(&self, plan_id: PlanId) -> Result<Option<Plan>, BillingRepositoryError>;

    async fn find_account(
        &self,
        user_id: UserId,
    ) -> Result<Option<UserAccount>, BillingRepositoryError>;

    /// Insert a pending transaction, apply the effect to the account and
    /// complete the transaction, all or nothing.
    async fn apply_purchase(
        &self,
        commit: &PurchaseCommit,
    ) -> Result<PurchaseReceipt, BillingRepositoryError>;
}

/// Fixture repository with no plans and no accounts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureBillingRepository;

#[async_trait]
impl BillingRepository for FixtureBillingRepository {
    async fn list_plans(&self) -> Result<Vec<Plan>, BillingRepositoryError> {
        Ok(Vec::new())
    }

    async fn find_plan(&self, _plan_id: PlanId) -> Result<Option<Plan>, BillingRepositoryError> {
        Ok(None)
    }

    async fn find_account(
        &self,
        _user_id: UserId,
    ) -> Result<Option<UserAccount>, BillingRepositoryError> {
        Ok(None)
    }

    async fn apply_purchase(
        &self,
        _commit: &PurchaseCommit,
    ) -> Result<PurchaseReceipt, BillingRepositoryError> {
        Err(BillingRepositoryError::account_missing())
    }
}
