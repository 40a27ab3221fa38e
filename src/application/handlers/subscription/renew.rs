//! RenewSubscriptionHandler - Command handler for extending a subscription.

use std::sync::Arc;

use crate::domain::subscription::{Owner, Subscription, SubscriptionError};
use crate::ports::{Clock, SubscriptionRepository};

use super::retry::update_current;

#[derive(Debug, Clone)]
pub struct RenewSubscriptionCommand {
    pub owner: Owner,
    /// Extend by a year instead of a month.
    pub annual: bool,
}

#[derive(Debug, Clone)]
pub struct RenewSubscriptionResult {
    pub subscription: Subscription,
}

/// Handler for renewals.
///
/// Reactivates the owner's current subscription and pushes `ended_at`
/// out by 365 or 30 days from its current value. Records no invoice and
/// emits no event.
pub struct RenewSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    clock: Arc<dyn Clock>,
    max_conflict_retries: u32,
}

impl RenewSubscriptionHandler {
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
        cmd: RenewSubscriptionCommand,
    ) -> Result<RenewSubscriptionResult, SubscriptionError> {
        let now = self.clock.now();
        let annual = cmd.annual;

        let subscription = update_current(
            self.subscriptions.as_ref(),
            &cmd.owner,
            self.max_conflict_retries,
            |subscription| Ok(subscription.renew(annual, now)?),
        )
        .await?;

        tracing::info!(
            subscription_id = %subscription.id,
            owner = %cmd.owner,
            annual,
            ended_at = ?subscription.ended_at,
            "Subscription renewed"
        );

        Ok(RenewSubscriptionResult { subscription })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::application::test_support::{owner, plan, MockSubscriptionRepository};
    use crate::domain::foundation::Timestamp;
    use crate::domain::subscription::{BillingCycle, SubscriptionStatus};
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap())
    }

    fn handler(repo: Arc<MockSubscriptionRepository>) -> RenewSubscriptionHandler {
        RenewSubscriptionHandler::new(repo, Arc::new(FixedClock::new(now())), 3)
    }

    fn existing() -> Subscription {
        Subscription::start(owner("user-1"), &plan(0), BillingCycle::Monthly, now().minus_days(10))
    }

    fn command(annual: bool) -> RenewSubscriptionCommand {
        RenewSubscriptionCommand {
            owner: owner("user-1"),
            annual,
        }
    }

    #[tokio::test]
    async fn annual_renewal_extends_from_period_end() {
        let sub = existing();
        let end = sub.ended_at.unwrap();
        let repo = Arc::new(MockSubscriptionRepository::with(vec![sub.clone()]));

        let result = handler(repo.clone()).handle(command(true)).await.unwrap();

        assert_eq!(result.subscription.ended_at, Some(end.add_days(365)));
        assert_eq!(result.subscription.status, SubscriptionStatus::Active);
        assert_eq!(repo.stored_by_id(sub.id).ended_at, Some(end.add_days(365)));
        assert!(repo.invoices().is_empty());
    }

    #[tokio::test]
    async fn monthly_renewal_reactivates_cancelled() {
        let mut sub = existing();
        sub.cancel(now()).unwrap();
        let end = sub.ended_at.unwrap();
        let repo = Arc::new(MockSubscriptionRepository::with(vec![sub]));

        let result = handler(repo).handle(command(false)).await.unwrap();

        assert!(result.subscription.is_active);
        assert_eq!(result.subscription.ended_at, Some(end.add_days(30)));
    }

    #[tokio::test]
    async fn missing_subscription_is_not_found() {
        let repo = Arc::new(MockSubscriptionRepository::new());

        let result = handler(repo.clone()).handle(command(true)).await;

        assert!(matches!(result, Err(SubscriptionError::NotFound(_))));
        assert_eq!(repo.update_calls(), 0);
    }

    #[tokio::test]
    async fn retries_after_version_conflict() {
        let sub = existing();
        let end = sub.ended_at.unwrap();
        let repo = Arc::new(MockSubscriptionRepository::with(vec![sub.clone()]));
        repo.conflict_next(2);

        let result = handler(repo.clone()).handle(command(false)).await.unwrap();

        assert_eq!(repo.update_calls(), 3);
        // Extended once, not once per attempt
        assert_eq!(result.subscription.ended_at, Some(end.add_days(30)));
        assert_eq!(repo.stored_by_id(sub.id).version, 1);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let sub = existing();
        let repo = Arc::new(MockSubscriptionRepository::with(vec![sub.clone()]));
        repo.conflict_next(10);

        let result = handler(repo.clone()).handle(command(false)).await;

        assert!(matches!(result, Err(SubscriptionError::Conflict(_))));
        assert_eq!(repo.update_calls(), 4);
        assert_eq!(repo.stored_by_id(sub.id).ended_at, sub.ended_at);
    }
}
