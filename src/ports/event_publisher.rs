//! EventPublisher port - Outbound sink for subscription events.
//!
//! Operations and the lifecycle sweep hand envelopes to this port; where
//! they go (in-memory bus, message broker) is the adapter's business.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Callers treat publishing as fire-and-forget: a failed publish is logged
/// and never undoes state that was already committed.
///
/// # Example
///
/// ```ignore
/// let envelope = TrialEnded::new(subscription, now).to_envelope()?;
/// publisher.publish(envelope).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events in order.
    ///
    /// Adapters without batching publish them one by one and stop at the
    /// first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
