//! In-memory plan catalog.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, PlanId};
use crate::domain::plan::Plan;
use crate::ports::PlanReader;

/// Plans seeded at startup or by tests. Plans are administered elsewhere,
/// so the only write is `insert`.
#[derive(Default)]
pub struct InMemoryPlanCatalog {
    plans: RwLock<HashMap<PlanId, Plan>>,
}

impl InMemoryPlanCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plans(plans: impl IntoIterator<Item = Plan>) -> Self {
        let catalog = Self::new();
        for plan in plans {
            catalog.insert(plan);
        }
        catalog
    }

    /// Add or replace a plan.
    pub fn insert(&self, plan: Plan) {
        self.plans
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(plan.id, plan);
    }
}

#[async_trait]
impl PlanReader for InMemoryPlanCatalog {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        Ok(self
            .plans
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned())
    }

    async fn list_active(&self) -> Result<Vec<Plan>, DomainError> {
        let mut active: Vec<Plan> = self
            .plans
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .filter(|p| p.is_active)
            .cloned()
            .collect();
        active.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inactive_plans_are_found_by_id_but_not_listed() {
        let active = Plan::new("Basic", 500, 5_000, "USD").unwrap();
        let mut retired = Plan::new("Legacy", 300, 3_000, "USD").unwrap();
        retired.is_active = false;
        let catalog = InMemoryPlanCatalog::with_plans([active.clone(), retired.clone()]);

        assert_eq!(catalog.find_by_id(&retired.id).await.unwrap(), Some(retired));
        assert_eq!(catalog.list_active().await.unwrap(), vec![active]);
    }

    #[tokio::test]
    async fn unknown_plan_is_none() {
        let catalog = InMemoryPlanCatalog::new();
        assert!(catalog.find_by_id(&PlanId::new()).await.unwrap().is_none());
    }
}
