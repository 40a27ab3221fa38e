//! EventLogger - Writes every received event to the log.
//!
//! Registered on the bus for all subscription event types when no other
//! consumer is configured, so emitted events are visible in operations.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};
use crate::ports::EventHandler;

/// Event types emitted by this crate.
pub const SUBSCRIPTION_EVENT_TYPES: [&str; 5] = [
    "subscription.subscribed.v1",
    "subscription.unsubscribed.v1",
    "subscription.trial_ended.v1",
    "subscription.expired.v1",
    "subscription.warning.v1",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct EventLogger;

#[async_trait]
impl EventHandler for EventLogger {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        tracing::info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            subscription_id = %event.aggregate_id,
            correlation_id = event.metadata.correlation_id.as_deref().unwrap_or("-"),
            "Subscription event"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "EventLogger"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::domain::foundation::{EventId, EventMetadata, Timestamp};
    use crate::ports::{EventPublisher, EventSubscriber};
    use std::sync::Arc;

    #[tokio::test]
    async fn logger_accepts_every_subscription_event() {
        let bus = InMemoryEventBus::new();
        bus.subscribe_all(&SUBSCRIPTION_EVENT_TYPES, Arc::new(EventLogger));

        for event_type in SUBSCRIPTION_EVENT_TYPES {
            let envelope = EventEnvelope {
                event_id: EventId::new(),
                event_type: event_type.to_string(),
                schema_version: 1,
                aggregate_id: "s-1".to_string(),
                aggregate_type: "Subscription".to_string(),
                occurred_at: Timestamp::now(),
                payload: serde_json::json!({}),
                metadata: EventMetadata::default(),
            };
            bus.publish(envelope).await.unwrap();
        }

        assert_eq!(bus.event_count(), 5);
    }
}
