//! In-memory storage adapters.
//!
//! Used when no database is configured and by the integration tests.

mod plan_catalog;
mod subscription_store;

pub use plan_catalog::InMemoryPlanCatalog;
pub use subscription_store::InMemorySubscriptionStore;
