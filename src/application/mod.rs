//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Owner-initiated commands live in `handlers`; the time-driven sweep lives
//! in `lifecycle`.

pub mod handlers;
pub mod lifecycle;

mod emitter;

#[cfg(test)]
pub(crate) mod test_support;

pub use emitter::EventEmitter;
pub use handlers::subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
    GetSubscriptionHandler, GetSubscriptionQuery, GetSubscriptionResult, ListSubscriptionsHandler,
    ListSubscriptionsQuery, ListSubscriptionsResult, RenewSubscriptionCommand,
    RenewSubscriptionHandler, RenewSubscriptionResult, ResumeSubscriptionCommand,
    ResumeSubscriptionHandler, ResumeSubscriptionResult, SubscribeCommand, SubscribeHandler,
    SubscribeResult,
};
pub use lifecycle::{
    SweepFailure, SweepFailureKind, SweepOptions, SweepReport, SweepScheduler,
    SweepSchedulerConfig, SweepSubscriptionsHandler,
};
