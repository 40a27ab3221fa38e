//! HTTP adapters - REST API implementations.

pub mod subscription;

pub use subscription::{subscription_router, SubscriptionAppState};
