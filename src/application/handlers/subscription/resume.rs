//! ResumeSubscriptionHandler - Command handler for reactivating a subscription.

use std::sync::Arc;

use crate::domain::subscription::{Owner, Subscription, SubscriptionError};
use crate::ports::{Clock, SubscriptionRepository};

use super::retry::update_current;

#[derive(Debug, Clone)]
pub struct ResumeSubscriptionCommand {
    pub owner: Owner,
}

#[derive(Debug, Clone)]
pub struct ResumeSubscriptionResult {
    pub subscription: Subscription,
    /// The period end had already passed when the subscription was resumed.
    pub period_already_ended: bool,
}

/// Handler for resuming subscriptions.
///
/// Sets the owner's current subscription to active whatever its status and
/// period end. Emits no event.
pub struct ResumeSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    clock: Arc<dyn Clock>,
    max_conflict_retries: u32,
}

impl ResumeSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        clock: Arc<dyn Clock>,
        max_conflict_retries: u32,
    ) -> Self {
        Self {
            subscriptions,
            clock,
            max_conflict_retries,
        }
    }

    pub async fn handle(
        &self,
        cmd: ResumeSubscriptionCommand,
    ) -> Result<ResumeSubscriptionResult, SubscriptionError> {
        let now = self.clock.now();

        let subscription = update_current(
            self.subscriptions.as_ref(),
            &cmd.owner,
            self.max_conflict_retries,
            |subscription| Ok(subscription.resume(now)?),
        )
        .await?;

        let period_already_ended = subscription.period_has_ended(now);
        if period_already_ended {
            tracing::warn!(
                subscription_id = %subscription.id,
                owner = %cmd.owner,
                ended_at = ?subscription.ended_at,
                "Resumed a subscription whose period has already ended"
            );
        } else {
            tracing::info!(
                subscription_id = %subscription.id,
                owner = %cmd.owner,
                "Subscription resumed"
            );
        }

        Ok(ResumeSubscriptionResult {
            subscription,
            period_already_ended,
        })
    }
}
