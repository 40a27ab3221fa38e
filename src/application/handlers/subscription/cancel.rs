//! CancelSubscriptionHandler - Command handler for cancelling subscriptions.

use std::sync::Arc;

use crate::application::EventEmitter;
use crate::domain::subscription::{Owner, Subscription, SubscriptionError, Unsubscribed};
use crate::ports::{Clock, PolicyDecision, SubscriptionPolicy, SubscriptionRepository};

use super::retry::update_current;

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub owner: Owner,
}

#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
    pub event: Unsubscribed,
}

/// Handler for cancelling subscriptions.
///
/// The policy decides whether the owner may cancel. A denial leaves the
/// subscription untouched and emits nothing. `ended_at` is not changed.
pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    policy: Arc<dyn SubscriptionPolicy>,
    emitter: EventEmitter,
    clock: Arc<dyn Clock>,
    max_conflict_retries: u32,
}

impl CancelSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        policy: Arc<dyn SubscriptionPolicy>,
        emitter: EventEmitter,
        clock: Arc<dyn Clock>,
        max_conflict_retries: u32,
    ) -> Self {
        Self {
            subscriptions,
            policy,
            emitter,
            clock,
            max_conflict_retries,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, SubscriptionError> {
        // 1. Ask the policy
        if let PolicyDecision::Deny(reason) = self.policy.can_cancel(&cmd.owner).await? {
            tracing::info!(owner = %cmd.owner, reason = ?reason, "Cancellation denied");
            return Err(SubscriptionError::denied(reason.user_message()));
        }

        // 2. Cancel and persist
        let now = self.clock.now();
        let subscription = update_current(
            self.subscriptions.as_ref(),
            &cmd.owner,
            self.max_conflict_retries,
            |subscription| Ok(subscription.cancel(now)?),
        )
        .await?;

        tracing::info!(
            subscription_id = %subscription.id,
            owner = %cmd.owner,
            "Subscription cancelled"
        );

        // 3. Emit event
        let event = Unsubscribed::new(subscription.id, cmd.owner.clone(), now);
        self.emitter
            .emit(&event, Some(cmd.owner.id.as_str()), None)
            .await;

        Ok(CancelSubscriptionResult {
            subscription,
            event,
        })
    }
}
