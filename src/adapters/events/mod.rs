//! Event bus adapters.
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus
//! - `EventLogger` - Handler that logs every subscription event

mod event_logger;
mod in_memory;

pub use event_logger::{EventLogger, SUBSCRIPTION_EVENT_TYPES};
pub use in_memory::InMemoryEventBus;
