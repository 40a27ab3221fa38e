//! Subscription domain events.
//!
//! Events published when a subscription changes:
//! - `Subscribed` - Owner started a subscription
//! - `Unsubscribed` - Owner cancelled
//! - `TrialEnded` - Sweep moved a trial to pending
//! - `SubscriptionExpired` - Sweep expired an active subscription
//! - `SubscriptionWarning` - Sweep found the period end near (no state change)

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{EventId, SubscriptionId, Timestamp};
use crate::domain_event;

use super::{Owner, Subscription};

// ════════════════════════════════════════════════════════════════════════════
// Subscribed
// ════════════════════════════════════════════════════════════════════════════

/// Published after a subscription and its first invoice are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscribed {
    pub event_id: EventId,

    pub subscription_id: SubscriptionId,

    /// Owner who subscribed.
    pub actor: Owner,

    pub occurred_at: Timestamp,
}

domain_event!(
    Subscribed,
    event_type = "subscription.subscribed.v1",
    aggregate_id = subscription_id,
    aggregate_type = "Subscription",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// Unsubscribed
// ════════════════════════════════════════════════════════════════════════════

/// Published when the owner cancels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unsubscribed {
    pub event_id: EventId,

    pub subscription_id: SubscriptionId,

    /// Owner who cancelled.
    pub actor: Owner,

    pub occurred_at: Timestamp,
}

domain_event!(
    Unsubscribed,
    event_type = "subscription.unsubscribed.v1",
    aggregate_id = subscription_id,
    aggregate_type = "Subscription",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// TrialEnded
// ════════════════════════════════════════════════════════════════════════════

/// Published when a trial reaches its end and the subscription turns pending.
///
/// Carries the subscription as persisted after the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialEnded {
    pub event_id: EventId,

    pub subscription_id: SubscriptionId,

    pub subscription: Subscription,

    pub occurred_at: Timestamp,
}

domain_event!(
    TrialEnded,
    event_type = "subscription.trial_ended.v1",
    aggregate_id = subscription_id,
    aggregate_type = "Subscription",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SubscriptionExpired
// ════════════════════════════════════════════════════════════════════════════

/// Published when an active subscription passes its period end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionExpired {
    pub event_id: EventId,

    pub subscription_id: SubscriptionId,

    pub subscription: Subscription,

    pub occurred_at: Timestamp,
}

domain_event!(
    SubscriptionExpired,
    event_type = "subscription.expired.v1",
    aggregate_id = subscription_id,
    aggregate_type = "Subscription",
    occurred_at = occurred_at,
    event_id = event_id
);

// ════════════════════════════════════════════════════════════════════════════
// SubscriptionWarning
// ════════════════════════════════════════════════════════════════════════════

/// Published on every sweep while the period end is inside the cycle's
/// warning window. Consumers deduplicate if they need to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionWarning {
    pub event_id: EventId,

    pub subscription_id: SubscriptionId,

    pub subscription: Subscription,

    /// Whole days between the sweep time and `ended_at`.
    pub days_until_expiration: i64,

    pub occurred_at: Timestamp,
}

domain_event!(
    SubscriptionWarning,
    event_type = "subscription.warning.v1",
    aggregate_id = subscription_id,
    aggregate_type = "Subscription",
    occurred_at = occurred_at,
    event_id = event_id
);

impl Subscribed {
    pub fn new(subscription_id: SubscriptionId, actor: Owner, occurred_at: Timestamp) -> Self {
        Self {
            event_id: EventId::new(),
            subscription_id,
            actor,
            occurred_at,
        }
    }
}

impl Unsubscribed {
    pub fn new(subscription_id: SubscriptionId, actor: Owner, occurred_at: Timestamp) -> Self {
        Self {
            event_id: EventId::new(),
            subscription_id,
            actor,
            occurred_at,
        }
    }
}

impl TrialEnded {
    pub fn new(subscription: Subscription, occurred_at: Timestamp) -> Self {
        Self {
            event_id: EventId::new(),
            subscription_id: subscription.id,
            subscription,
            occurred_at,
        }
    }
}

impl SubscriptionExpired {
    pub fn new(subscription: Subscription, occurred_at: Timestamp) -> Self {
        Self {
            event_id: EventId::new(),
            subscription_id: subscription.id,
            subscription,
            occurred_at,
        }
    }
}

impl SubscriptionWarning {
    pub fn new(subscription: Subscription, days_until_expiration: i64, occurred_at: Timestamp) -> Self {
        Self {
            event_id: EventId::new(),
            subscription_id: subscription.id,
            subscription,
            days_until_expiration,
            occurred_at,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Unit Tests
// ════════════════════════════════════════════════════════════════════════════
