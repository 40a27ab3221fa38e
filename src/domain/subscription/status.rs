//! Subscription status state machine.
//!
//! Defines every subscription state and the transitions the lifecycle
//! operations and the daily sweep are allowed to perform.

use crate::domain::foundation::{StateMachine, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Plan has a trial and the trial has not ended yet.
    Trial,

    /// Trial ended; waiting for the first paid period.
    Pending,

    /// Paid period in progress.
    Active,

    /// Owner cancelled. Stays here until resumed or renewed.
    Cancelled,

    /// Paid period ran out without renewal.
    Expired,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
        }
    }

    /// Statuses the sweep never moves out of on its own.
    pub fn is_resting(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Cancelled | SubscriptionStatus::Expired
        )
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From TRIAL
            (Trial, Pending)
                | (Trial, Cancelled)
            // From ACTIVE
                | (Active, Expired)
                | (Active, Cancelled)
            // Resume and renew reactivate from anywhere
                | (_, Active)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Trial => vec![Pending, Cancelled, Active],
            Pending => vec![Active],
            Active => vec![Expired, Cancelled, Active],
            Cancelled => vec![Active],
            Expired => vec![Active],
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(SubscriptionStatus::Trial),
            "pending" => Ok(SubscriptionStatus::Pending),
            "active" => Ok(SubscriptionStatus::Active),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            "expired" => Ok(SubscriptionStatus::Expired),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown subscription status '{}'", other),
            )),
        }
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
