//! Subscription and credit plans.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PlanId;

/// Billing model of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlanType {
    /// Starter allowance of free credits.
    Free,
    /// Credits bought per document.
    OneTimeDocument,
    /// Recurring subscription, optionally capped per day.
    MonthlySubscription,
}

impl PlanType {
    /// Storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::OneTimeDocument => "one_time_document",
            Self::MonthlySubscription => "monthly_subscription",
        }
    }
}

/// Raised when a stored plan type is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plan type: {0}")]
pub struct UnknownPlanType(pub String);

impl FromStr for PlanType {
    type Err = UnknownPlanType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "one_time_document" => Ok(Self::OneTimeDocument),
            "monthly_subscription" => Ok(Self::MonthlySubscription),
            other => Err(UnknownPlanType(other.to_owned())),
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plan reference data. Immutable for the lifetime of a request.
///
/// Monetary amounts are held in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub plan_type: PlanType,
    #[schema(example = 999)]
    pub price_minor: i64,
    #[schema(example = "USD")]
    pub currency: String,
    #[schema(example = 199)]
    pub document_cost_minor: i64,
    pub is_watermarked_export: bool,
    /// Daily export cap for subscriptions; `None` means unlimited.
    pub max_documents_per_day: Option<u32>,
    /// Credits granted when an account joins the plan.
    pub initial_credits: i32,
    pub features: Vec<String>,
}
