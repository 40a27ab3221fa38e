//! EventEmitter - Fire-and-forget publishing of subscription events.
//!
//! State changes are committed before their event is emitted. A publish
//! failure is logged and swallowed; it never undoes the committed change.

use std::sync::Arc;

use crate::domain::foundation::{DomainEvent, SerializableDomainEvent};
use crate::ports::EventPublisher;

#[derive(Clone)]
pub struct EventEmitter {
    publisher: Arc<dyn EventPublisher>,
}

impl EventEmitter {
    pub fn new(publisher: Arc<dyn EventPublisher>) -> Self {
        Self { publisher }
    }

    /// Publish `event`, tagging the envelope with the initiating owner and
    /// a correlation id when given.
    ///
    /// Returns whether the event reached the publisher.
    pub async fn emit<E>(&self, event: &E, owner_id: Option<&str>, correlation_id: Option<&str>) -> bool
    where
        E: SerializableDomainEvent,
    {
        let mut envelope = match event.to_envelope() {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(
                    event_type = event.event_type(),
                    subscription_id = %event.aggregate_id(),
                    error = %e,
                    "Failed to build event envelope"
                );
                return false;
            }
        };

        if let Some(owner_id) = owner_id {
            envelope = envelope.with_owner_id(owner_id);
        }
        if let Some(correlation_id) = correlation_id {
            envelope = envelope.with_correlation_id(correlation_id);
        }

        let event_type = envelope.event_type.clone();
        let event_id = envelope.event_id.clone();
        match self.publisher.publish(envelope).await {
            Ok(()) => {
                tracing::debug!(event_type = %event_type, event_id = %event_id, "Event published");
                true
            }
            Err(e) => {
                tracing::warn!(
                    event_type = %event_type,
                    event_id = %event_id,
                    subscription_id = %event.aggregate_id(),
                    error = %e,
                    "Failed to publish event"
                );
                false
            }
        }
    }
}
