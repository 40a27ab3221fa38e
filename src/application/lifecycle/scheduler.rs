//! SweepScheduler - Runs the lifecycle sweep on a fixed interval.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 24h | Time between sweep starts |
//! | `options` | sequential, no time budget | Passed to every sweep |
//!
//! ## Graceful Shutdown
//!
//! The scheduler listens for a shutdown signal. A sweep already running is
//! finished before the loop exits; no new sweep is started afterwards.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use super::{SweepOptions, SweepReport, SweepSubscriptionsHandler};
use crate::domain::foundation::DomainError;

/// Configuration for the SweepScheduler.
#[derive(Debug, Clone)]
pub struct SweepSchedulerConfig {
    pub interval: Duration,
    pub options: SweepOptions,
}

impl Default for SweepSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 60 * 60),
            options: SweepOptions::default(),
        }
    }
}

impl SweepSchedulerConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_options(mut self, options: SweepOptions) -> Self {
        self.options = options;
        self
    }
}

pub struct SweepScheduler {
    handler: Arc<SweepSubscriptionsHandler>,
    config: SweepSchedulerConfig,
}

impl SweepScheduler {
    pub fn new(handler: Arc<SweepSubscriptionsHandler>) -> Self {
        Self::with_config(handler, SweepSchedulerConfig::default())
    }

    pub fn with_config(handler: Arc<SweepSubscriptionsHandler>, config: SweepSchedulerConfig) -> Self {
        Self { handler, config }
    }

    /// Sweep now, then on every interval tick, until `shutdown` flips to true.
    ///
    /// A failed sweep is logged and the loop keeps going.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            concurrency = self.config.options.concurrency,
            "Sweep scheduler started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("Sweep scheduler stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.run_once().await {
                        tracing::error!(error = %e, "Subscription sweep failed");
                    }
                }
            }
        }
    }

    /// Run a single sweep with the configured options.
    pub async fn run_once(&self) -> Result<SweepReport, DomainError> {
        self.handler.execute(&self.config.options).await
    }
}
