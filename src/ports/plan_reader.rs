//! Plan reader port.
//!
//! Plans and their features are administered outside this crate, so the
//! lifecycle only needs read access.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::plan::Plan;

#[async_trait]
pub trait PlanReader: Send + Sync {
    /// Load a plan with its feature associations.
    ///
    /// Returns `None` if the plan does not exist. Inactive plans are returned
    /// and left for the caller to reject.
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError>;

    /// Every active plan.
    async fn list_active(&self) -> Result<Vec<Plan>, DomainError>;
}
