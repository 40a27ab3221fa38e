//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `SubscriptionRepository` - Subscription persistence with compare-and-swap updates
//! - `PlanReader` - Read access to plans and their features
//! - `InvoiceLedger` - Append-only invoice records
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing domain events
//! - `EventSubscriber` - Port for subscribing to domain events
//! - `EventHandler` - Handler that processes incoming events
//!
//! ## Collaborators
//!
//! - `SubscriptionPolicy` - Cancel and entitlement checks
//! - `Clock` - Source of the current time

mod clock;
mod event_publisher;
mod event_subscriber;
mod invoice_ledger;
mod plan_reader;
mod subscription_policy;
mod subscription_repository;

pub use clock::Clock;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use invoice_ledger::InvoiceLedger;
pub use plan_reader::PlanReader;
pub use subscription_policy::{DenyReason, FeatureUsage, PolicyDecision, SubscriptionPolicy};
pub use subscription_repository::SubscriptionRepository;
