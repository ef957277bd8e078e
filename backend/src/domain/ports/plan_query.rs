//! Driving port for listing plans.

use async_trait::async_trait;

use crate::domain::{Error, Plan};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanQuery: Send + Sync {
    /// All plans ordered by id.
    async fn list_plans(&self) -> Result<Vec<Plan>, Error>;
}
