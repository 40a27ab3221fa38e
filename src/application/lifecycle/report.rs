//! Sweep options and the report returned by one sweep.

use std::time::Duration;

use serde::Serialize;

use crate::domain::foundation::{SubscriptionId, Timestamp};

/// Tuning for one sweep.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Subscriptions processed at the same time.
    pub concurrency: usize,

    /// Stop starting new subscriptions after this long. Unvisited ones are
    /// picked up by the next sweep.
    pub max_duration: Option<Duration>,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            max_duration: None,
        }
    }
}

impl SweepOptions {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepFailureKind {
    /// Another writer changed the subscription during the sweep.
    Conflict,
    /// The store rejected the write.
    Storage,
    /// The status no longer allowed the transition.
    InvalidState,
}

/// A subscription the sweep could not update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepFailure {
    pub subscription_id: SubscriptionId,
    pub kind: SweepFailureKind,
    pub message: String,
}

/// What one sweep did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Correlation id stamped on every event of this sweep.
    pub sweep_id: String,
    /// Time every rule was evaluated against.
    pub swept_at: Timestamp,
    pub visited: usize,
    pub trials_ended: usize,
    pub expired: usize,
    pub warnings: usize,
    pub failures: Vec<SweepFailure>,
    /// The time budget ran out before every subscription was visited.
    pub truncated: bool,
}

impl SweepReport {
    pub(super) fn new(sweep_id: String, swept_at: Timestamp) -> Self {
        Self {
            sweep_id,
            swept_at,
            visited: 0,
            trials_ended: 0,
            expired: 0,
            warnings: 0,
            failures: Vec::new(),
            truncated: false,
        }
    }

    /// Number of subscriptions whose status changed.
    pub fn transitions(&self) -> usize {
        self.trials_ended + self.expired
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_is_at_least_one() {
        assert_eq!(SweepOptions::default().with_concurrency(0).concurrency, 1);
    }

    #[test]
    fn empty_report_is_clean() {
        let report = SweepReport::new("s".to_string(), Timestamp::now());
        assert!(report.is_clean());
        assert_eq!(report.transitions(), 0);
    }

    #[test]
    fn truncated_report_is_not_clean() {
        let mut report = SweepReport::new("s".to_string(), Timestamp::now());
        report.truncated = true;
        assert!(!report.is_clean());
    }
}
