//! Time-driven reconciliation rules.
//!
//! Given a subscription and the current time, decide the one thing the
//! lifecycle sweep should do with it. Rules are checked in order and the
//! first match wins:
//!
//! 1. Trial reached `trial_ends_at` → end the trial
//! 2. Active reached `ended_at` → expire
//! 3. `ended_at` within the cycle's warning window → warn (no mutation)
//!
//! A missing timestamp makes the matching rule silently not apply.

use crate::domain::foundation::Timestamp;

use super::{Subscription, SubscriptionStatus};

/// Outcome of evaluating one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    EndTrial,
    Expire,
    /// Renewal is near; carries the whole days until `ended_at`.
    Warn { days_until_renewal: i64 },
    Nothing,
}

impl LifecycleAction {
    /// Whether the action changes stored state.
    pub fn mutates(&self) -> bool {
        matches!(self, LifecycleAction::EndTrial | LifecycleAction::Expire)
    }
}

impl Subscription {
    /// Decide the sweep action for this subscription at `now`.
    pub fn reconcile(&self, now: Timestamp) -> LifecycleAction {
        if self.status == SubscriptionStatus::Trial && self.trial_has_ended(now) {
            return LifecycleAction::EndTrial;
        }

        if self.status == SubscriptionStatus::Active && self.period_has_ended(now) {
            return LifecycleAction::Expire;
        }

        match self.days_until_renewal(now) {
            Some(days) if days <= self.billing_cycle.warning_window_days() => {
                LifecycleAction::Warn {
                    days_until_renewal: days,
                }
            }
            _ => LifecycleAction::Nothing,
        }
    }
}
