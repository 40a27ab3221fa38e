//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-process storage for subscriptions, invoices and plans
//! - `postgres` - PostgreSQL storage
//! - `events` - In-memory event bus and logging handler
//! - `policy` - Grace-period cancel policy and entitlement checks
//! - `clock` - System and fixed clocks
//! - `http` - Axum routes

pub mod clock;
pub mod events;
pub mod http;
pub mod memory;
pub mod policy;
pub mod postgres;

pub use clock::{FixedClock, SystemClock};
pub use events::{EventLogger, InMemoryEventBus};
pub use memory::{InMemoryPlanCatalog, InMemorySubscriptionStore};
pub use policy::GracePeriodPolicy;
