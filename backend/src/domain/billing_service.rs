//! Plan listing and simulated checkout.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Months;
use mockable::Clock;
use serde_json::json;

use crate::domain::ports::{
    BillingCommand, BillingRepository, BillingRepositoryError, PlanQuery, PurchaseCommit,
    PurchaseEffect, PurchaseRequest, PurchaseResponse,
};
use crate::domain::{Error, Plan, PlanType, TransactionId};

/// Reference recorded on a completed simulated payment.
///
/// # Examples
/// ```
/// use assignment_formatter::domain::{TransactionId, payment_reference};
///
/// let id = TransactionId::new(12).expect("valid id");
/// assert_eq!(payment_reference(id), "SIMULATED_REF_12");
/// ```
#[must_use]
pub fn payment_reference(transaction_id: TransactionId) -> String {
    format!("SIMULATED_REF_{transaction_id}")
}

/// Billing service implementing [`BillingCommand`] and [`PlanQuery`].
#[derive(Clone)]
pub struct BillingService<B> {
    repo: Arc<B>,
    clock: Arc<dyn Clock>,
}

impl<B> BillingService<B> {
    pub fn new(repo: Arc<B>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<B> BillingService<B>
where
    B: BillingRepository,
{
    fn map_repository_error(error: BillingRepositoryError) -> Error {
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

    /// Amount charged and account effect for buying `quantity` of `plan`.
    fn price(&self, plan: &Plan, quantity: u32) -> Result<(i64, PurchaseEffect), Error> {
        match plan.plan_type {
            PlanType::Free => Err(Error::invalid_request("Invalid plan type for payment")
                .with_details(json!({ "planType": plan.plan_type.as_str() }))),
            PlanType::OneTimeDocument => {
                let amount = plan
                    .document_cost_minor
                    .checked_mul(i64::from(quantity))
                    .ok_or_else(|| Error::invalid_request("quantity is too large"))?;
                Ok((amount, PurchaseEffect::AddCredits(quantity)))
            }
            PlanType::MonthlySubscription => {
                let until = self
                    .clock
                    .utc()
                    .checked_add_months(Months::new(1))
                    .ok_or_else(|| Error::internal("subscription end out of range"))?;
                Ok((
                    plan.price_minor,
                    PurchaseEffect::Subscribe {
                        plan_id: plan.id,
                        until,
                    },
                ))
            }
        }
    }
}

#[async_trait]
impl<B> BillingCommand for BillingService<B>
where
    B: BillingRepository,
{
    async fn purchase(&self, request: PurchaseRequest) -> Result<PurchaseResponse, Error> {
        if request.quantity == 0 {
            return Err(Error::invalid_request("quantity must be at least 1"));
        }
        let plan = self
            .repo
            .find_plan(request.plan_id)
            .await
            .map_err(Self::map_repository_error)?
            .ok_or_else(|| Error::not_found("Plan not found"))?;
        let (amount_minor, effect) = self.price(&plan, request.quantity)?;

        let commit = PurchaseCommit {
            user_id: request.user_id,
            plan_id: plan.id,
            amount_minor,
            currency: plan.currency.clone(),
            effect,
        };
        let receipt = self
            .repo
            .apply_purchase(&commit)
            .await
            .map_err(Self::map_repository_error)?;
        tracing::info!(
            user_id = %request.user_id,
            plan_id = %plan.id,
            transaction_id = %receipt.transaction_id,
            amount_minor,
            "simulated payment completed"
        );

        Ok(PurchaseResponse {
            transaction_id: receipt.transaction_id,
            reference: receipt.reference,
            amount_minor,
            currency: commit.currency,
        })
    }
}

#[async_trait]
impl<B> PlanQuery for BillingService<B>
where
    B: BillingRepository,
{
    async fn list_plans(&self) -> Result<Vec<Plan>, Error> {
        self.repo
            .list_plans()
            .await
            .map_err(Self::map_repository_error)
    }
}

#[cfg(test)]
#[path = "billing_service_tests.rs"]
mod tests;
