//! SweepSubscriptionsHandler - One pass of the lifecycle engine.
//!
//! Visits every subscription once and applies the first matching
//! reconciliation rule: end trial, expire, or warn. Each subscription is
//! handled on its own; a failure is recorded in the report and the sweep
//! moves on.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use uuid::Uuid;

use crate::application::EventEmitter;
use crate::domain::foundation::{DomainError, Repository, Timestamp};
use crate::domain::subscription::{
    LifecycleAction, Subscription, SubscriptionExpired, SubscriptionWarning, TrialEnded,
};
use crate::ports::{Clock, SubscriptionRepository};

use super::{SweepFailure, SweepFailureKind, SweepOptions, SweepReport};

/// What happened to one subscription.
enum Visit {
    TrialEnded,
    Expired,
    Warned,
    Untouched,
    /// Not visited; the time budget ran out.
    Skipped,
    Failed(SweepFailure),
}

pub struct SweepSubscriptionsHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    emitter: EventEmitter,
    clock: Arc<dyn Clock>,
}

impl SweepSubscriptionsHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        emitter: EventEmitter,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            emitter,
            clock,
        }
    }

    /// Run one sweep.
    ///
    /// # Errors
    ///
    /// Only loading the subscriptions can fail the sweep as a whole.
    pub async fn execute(&self, options: &SweepOptions) -> Result<SweepReport, DomainError> {
        let now = self.clock.now();
        let sweep_id = Uuid::new_v4().to_string();
        let started = Instant::now();
        let deadline = options.max_duration.map(|budget| started + budget);

        let subscriptions = self.subscriptions.find_all().await?;
        tracing::info!(
            sweep_id = %sweep_id,
            subscriptions = subscriptions.len(),
            concurrency = options.concurrency,
            "Subscription sweep started"
        );

        let visits: Vec<Visit> = stream::iter(subscriptions)
            .map(|subscription| {
                let sweep_id = sweep_id.as_str();
                async move {
                    if deadline.map(|d| Instant::now() >= d).unwrap_or(false) {
                        return Visit::Skipped;
                    }
                    self.visit(subscription, now, sweep_id).await
                }
            })
            .buffer_unordered(options.concurrency.max(1))
            .collect()
            .await;

        let mut report = SweepReport::new(sweep_id, now);
        for visit in visits {
            match visit {
                Visit::Skipped => {
                    report.truncated = true;
                    continue;
                }
                Visit::TrialEnded => report.trials_ended += 1,
                Visit::Expired => report.expired += 1,
                Visit::Warned => report.warnings += 1,
                Visit::Untouched => {}
                Visit::Failed(failure) => report.failures.push(failure),
            }
            report.visited += 1;
        }

        tracing::info!(
            sweep_id = %report.sweep_id,
            visited = report.visited,
            trials_ended = report.trials_ended,
            expired = report.expired,
            warnings = report.warnings,
            failures = report.failures.len(),
            truncated = report.truncated,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Subscription sweep finished"
        );

        Ok(report)
    }

    async fn visit(&self, mut subscription: Subscription, now: Timestamp, sweep_id: &str) -> Visit {
        match subscription.reconcile(now) {
            LifecycleAction::EndTrial => {
                if let Err(failure) = self
                    .persist(&mut subscription, |s| s.end_trial(now))
                    .await
                {
                    return Visit::Failed(failure);
                }
                tracing::info!(subscription_id = %subscription.id, "Trial ended");
                let event = TrialEnded::new(subscription, now);
                self.emitter.emit(&event, None, Some(sweep_id)).await;
                Visit::TrialEnded
            }
            LifecycleAction::Expire => {
                if let Err(failure) = self.persist(&mut subscription, |s| s.expire(now)).await {
                    return Visit::Failed(failure);
                }
                tracing::info!(subscription_id = %subscription.id, "Subscription expired");
                let event = SubscriptionExpired::new(subscription, now);
                self.emitter.emit(&event, None, Some(sweep_id)).await;
                Visit::Expired
            }
            LifecycleAction::Warn { days_until_renewal } => {
                tracing::debug!(
                    subscription_id = %subscription.id,
                    days_until_renewal,
                    "Renewal warning"
                );
                let event = SubscriptionWarning::new(subscription, days_until_renewal, now);
                self.emitter.emit(&event, None, Some(sweep_id)).await;
                Visit::Warned
            }
            LifecycleAction::Nothing => Visit::Untouched,
        }
    }

    /// Apply a transition and write it with a version check. Never retried:
    /// a conflicting writer has seen newer state, and the next sweep
    /// re-evaluates it.
    async fn persist<F>(&self, subscription: &mut Subscription, transition: F) -> Result<(), SweepFailure>
    where
        F: FnOnce(&mut Subscription) -> Result<(), DomainError>,
    {
        let id = subscription.id;

        if let Err(e) = transition(subscription) {
            tracing::warn!(subscription_id = %id, error = %e, "Sweep transition rejected");
            return Err(SweepFailure {
                subscription_id: id,
                kind: SweepFailureKind::InvalidState,
                message: e.to_string(),
            });
        }

        match self.subscriptions.update(subscription).await {
            Ok(()) => {
                subscription.version += 1;
                Ok(())
            }
            Err(e) => {
                let kind = if e.is_conflict() {
                    SweepFailureKind::Conflict
                } else {
                    SweepFailureKind::Storage
                };
                tracing::warn!(
                    subscription_id = %id,
                    kind = ?kind,
                    error = %e,
                    "Failed to persist sweep transition"
                );
                Err(SweepFailure {
                    subscription_id: id,
                    kind,
                    message: e.to_string(),
                })
            }
        }
    }
}
