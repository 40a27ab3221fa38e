//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, error types and the shared traits
//! (state machine, repository, domain events) used by every aggregate.

mod errors;
mod events;
mod ids;
mod repository;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent};
pub use ids::{FeatureId, InvoiceId, OwnerId, PlanId, SubscriptionId};
pub use repository::Repository;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
