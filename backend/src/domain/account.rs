//! User account state relevant to exports and billing.
//!
//! Registration and login belong to an external collaborator; this crate only
//! reads the account's credit balance and current plan, and mutates them when
//! an export commits or a purchase completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{PlanId, UserId};

/// Account snapshot loaded for a single request.
///
/// `document_credits` is never negative: every decrement is guarded by a
/// compare-and-set on the stored balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub document_credits: i32,
    pub current_plan_id: PlanId,
    /// End of the paid subscription window, when one is active.
    pub subscription_end: Option<DateTime<Utc>>,
}

impl UserAccount {
    /// Whether the account has at least one credit to spend.
    #[must_use]
    pub fn has_credits(&self) -> bool {
        self.document_credits > 0
    }
}
