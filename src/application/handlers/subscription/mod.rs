//! Subscription handlers.
//!
//! ## Commands
//! - Subscribing to a plan (subscription + first invoice)
//! - Renewing, cancelling and resuming the owner's current subscription
//!
//! ## Queries
//! - Current subscription with invoices
//! - Subscription history of an owner

mod cancel;
mod get_subscription;
mod list_subscriptions;
mod renew;
mod resume;
mod retry;
mod subscribe;

// Commands
pub use cancel::{CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult};
pub use renew::{RenewSubscriptionCommand, RenewSubscriptionHandler, RenewSubscriptionResult};
pub use resume::{ResumeSubscriptionCommand, ResumeSubscriptionHandler, ResumeSubscriptionResult};
pub use subscribe::{SubscribeCommand, SubscribeHandler, SubscribeResult};

// Queries
pub use get_subscription::{GetSubscriptionHandler, GetSubscriptionQuery, GetSubscriptionResult};
pub use list_subscriptions::{
    ListSubscriptionsHandler, ListSubscriptionsQuery, ListSubscriptionsResult,
};
