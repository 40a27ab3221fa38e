//! Lifecycle sweep configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::lifecycle::{SweepOptions, SweepSchedulerConfig};

const MAX_CONCURRENCY: usize = 64;

/// Lifecycle sweep configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LifecycleConfig {
    /// Seconds between sweep starts
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Subscriptions processed in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Optional time budget per sweep in seconds
    #[serde(default)]
    pub max_duration_secs: Option<u64>,
}

impl LifecycleConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn sweep_options(&self) -> SweepOptions {
        let options = SweepOptions::default().with_concurrency(self.concurrency);
        match self.max_duration_secs {
            Some(secs) => options.with_max_duration(Duration::from_secs(secs)),
            None => options,
        }
    }

    pub fn scheduler_config(&self) -> SweepSchedulerConfig {
        SweepSchedulerConfig::default()
            .with_interval(self.sweep_interval())
            .with_options(self.sweep_options())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sweep_interval_secs == 0 {
            return Err(ValidationError::rejected(
                "SUBSCRIPTIONS__LIFECYCLE__SWEEP_INTERVAL_SECS",
                0,
                "sweeps need at least one second between starts",
            ));
        }
        if self.concurrency == 0 || self.concurrency > MAX_CONCURRENCY {
            return Err(ValidationError::rejected(
                "SUBSCRIPTIONS__LIFECYCLE__CONCURRENCY",
                self.concurrency,
                "must be between 1 and 64",
            ));
        }
        if self.max_duration_secs == Some(0) {
            return Err(ValidationError::rejected(
                "SUBSCRIPTIONS__LIFECYCLE__MAX_DURATION_SECS",
                0,
                "a sweep needs at least one second",
            ));
        }
        Ok(())
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            concurrency: default_concurrency(),
            max_duration_secs: None,
        }
    }
}

fn default_sweep_interval() -> u64 {
    24 * 60 * 60
}

fn default_concurrency() -> usize {
    1
}
