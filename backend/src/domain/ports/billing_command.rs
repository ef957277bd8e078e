//! Driving port for the simulated checkout.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PlanId, TransactionId, UserId};

/// Purchase request. `quantity` only matters for pay-per-document plans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    pub user_id: UserId,
    pub plan_id: PlanId,
    pub quantity: u32,
}

/// Completed purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub transaction_id: TransactionId,
    #[schema(example = "SIMULATED_REF_1")]
    pub reference: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Driving port for purchases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BillingCommand: Send + Sync {
    /// Record and apply a simulated payment.
    ///
    /// # Errors
    ///
    /// - `not_found` for an unknown plan or account.
    /// - `invalid_request` for free plans or a zero quantity.
    async fn purchase(&self, request: PurchaseRequest) -> Result<PurchaseResponse, Error>;
}
