//! EventSubscriber port - Registration of handlers for published events.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing domain events.
///
/// Handlers should be idempotent: warnings re-fire on every sweep while a
/// subscription stays inside its warning window.
///
/// # Example
///
/// ```ignore
/// struct RenewalMailer { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for RenewalMailer {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let warning: SubscriptionWarning = event.payload_as()?;
///         // Queue a reminder...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "RenewalMailer"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}

/// Port for subscribing to domain events by type.
///
/// ```ignore
/// subscriber.subscribe("subscription.warning.v1", mailer);
/// subscriber.subscribe_all(&["subscription.expired.v1", "subscription.unsubscribed.v1"], access_sync);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Subscribe handler to a specific event type.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Subscribe the same handler to several event types.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>);
}

/// Combined trait for event bus implementations.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that traits are object-safe
    #[allow(dead_code)]
    fn assert_handler_object_safe(_: &dyn EventHandler) {}

    #[allow(dead_code)]
    fn assert_subscriber_object_safe(_: &dyn EventSubscriber) {}

    #[allow(dead_code)]
    fn assert_bus_object_safe(_: &dyn EventBus) {}
}
