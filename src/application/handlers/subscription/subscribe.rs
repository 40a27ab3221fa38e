//! SubscribeHandler - Command handler for starting a subscription.

use std::sync::Arc;

use crate::application::EventEmitter;
use crate::domain::foundation::{ErrorCode, PlanId};
use crate::domain::subscription::{
    BillingCycle, Invoice, Owner, Subscribed, Subscription, SubscriptionError,
};
use crate::ports::{Clock, PlanReader, SubscriptionRepository};

/// Command to subscribe an owner to a plan.
#[derive(Debug, Clone)]
pub struct SubscribeCommand {
    pub owner: Owner,
    pub plan_id: PlanId,
    pub billing_cycle: BillingCycle,
}

/// Result of a successful subscribe.
#[derive(Debug, Clone)]
pub struct SubscribeResult {
    pub subscription: Subscription,
    pub invoice: Invoice,
    pub event: Subscribed,
}

/// Handler for starting subscriptions.
///
/// The subscription and its first invoice are stored in one atomic write,
/// which also enforces one open subscription per owner. `Subscribed` is
/// emitted only after that write succeeded.
pub struct SubscribeHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanReader>,
    emitter: EventEmitter,
    clock: Arc<dyn Clock>,
    allow_multiple: bool,
}

impl SubscribeHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanReader>,
        emitter: EventEmitter,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            emitter,
            clock,
            allow_multiple: false,
        }
    }

    /// Let owners start a subscription while another one is still open.
    pub fn allow_multiple(mut self, allow: bool) -> Self {
        self.allow_multiple = allow;
        self
    }

    pub async fn handle(&self, cmd: SubscribeCommand) -> Result<SubscribeResult, SubscriptionError> {
        let now = self.clock.now();

        // 1. Resolve the plan
        let plan = self
            .plans
            .find_by_id(&cmd.plan_id)
            .await?
            .filter(|plan| plan.is_active)
            .ok_or_else(|| SubscriptionError::plan_not_found(cmd.plan_id))?;

        // 2. Build subscription and first invoice (domain logic)
        let subscription = Subscription::start(cmd.owner.clone(), &plan, cmd.billing_cycle, now);
        let invoice = Invoice::first_for(&subscription, &plan, now);

        // 3. Persist both atomically, refusing a second open subscription
        //    inside the same write unless multiple are allowed
        let stored = if self.allow_multiple {
            self.subscriptions
                .create_with_invoice(&subscription, &invoice)
                .await
        } else {
            self.subscriptions
                .create_exclusive_with_invoice(&subscription, &invoice)
                .await
        };
        stored.map_err(|err| match err.code {
            ErrorCode::SubscriptionExists => SubscriptionError::already_subscribed(cmd.owner.id.clone()),
            _ => SubscriptionError::from(err),
        })?;

        tracing::info!(
            subscription_id = %subscription.id,
            owner = %cmd.owner,
            plan_id = %plan.id,
            status = %subscription.status,
            billing_cycle = %subscription.billing_cycle,
            invoice_number = %invoice.invoice_number,
            "Subscription started"
        );

        // 4. Emit event
        let event = Subscribed::new(subscription.id, cmd.owner.clone(), now);
        self.emitter
            .emit(&event, Some(cmd.owner.id.as_str()), None)
            .await;

        Ok(SubscribeResult {
            subscription,
            invoice,
            event,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemorySubscriptionStore;
    use crate::application::test_support::{
        owner, plan, MockEventPublisher, MockPlanReader, MockSubscriptionRepository,
    };
    use crate::domain::foundation::Timestamp;
    use crate::domain::plan::Plan;
    use crate::domain::subscription::{InvoiceStatus, SubscriptionStatus};
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Timestamp::from_datetime(Utc.with_ymd_and_hms(2024, 5, 5, 12, 0, 0).unwrap())
    }

    struct Fixture {
        repo: Arc<MockSubscriptionRepository>,
        publisher: Arc<MockEventPublisher>,
        handler: SubscribeHandler,
    }

    fn fixture(plans: Vec<Plan>, repo: MockSubscriptionRepository) -> Fixture {
        let repo = Arc::new(repo);
        let publisher = Arc::new(MockEventPublisher::new());
        let handler = SubscribeHandler::new(
            repo.clone(),
            Arc::new(MockPlanReader::with(plans)),
            EventEmitter::new(publisher.clone()),
            Arc::new(FixedClock::new(now())),
        );
        Fixture {
            repo,
            publisher,
            handler,
        }
    }

    fn command(plan_id: PlanId, cycle: BillingCycle) -> SubscribeCommand {
        SubscribeCommand {
            owner: owner("user-1"),
            plan_id,
            billing_cycle: cycle,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Success Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn trial_plan_starts_trial_with_one_invoice() {
        let plan = plan(5);
        let f = fixture(vec![plan.clone()], MockSubscriptionRepository::new());

        let result = f
            .handler
            .handle(command(plan.id, BillingCycle::Monthly))
            .await
            .unwrap();

        let sub = &result.subscription;
        assert_eq!(sub.status, SubscriptionStatus::Trial);
        assert_eq!(sub.trial_ends_at, Some(now().add_days(5)));
        assert_eq!(sub.started_at, now().add_days(5));
        assert_eq!(sub.ended_at, Some(now().add_days(35)));

        let invoices = f.repo.invoices();
        assert_eq!(invoices.len(), 1);
        assert_eq!(invoices[0].amount, plan.monthly_price);
        assert_eq!(invoices[0].status, InvoiceStatus::Open);
        assert_eq!(invoices[0].subscription_id, sub.id);
    }

    #[tokio::test]
    async fn plan_without_trial_starts_active_yearly() {
        let plan = plan(0);
        let f = fixture(vec![plan.clone()], MockSubscriptionRepository::new());

        let result = f
            .handler
            .handle(command(plan.id, BillingCycle::Yearly))
            .await
            .unwrap();

        let sub = &result.subscription;
        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.started_at, now());
        assert_eq!(sub.ended_at, Some(now().add_days(365)));
        assert_eq!(f.repo.invoices().len(), 1);
        assert_eq!(result.invoice.amount, plan.yearly_price);
    }

    #[tokio::test]
    async fn emits_subscribed_with_actor() {
        let plan = plan(0);
        let f = fixture(vec![plan.clone()], MockSubscriptionRepository::new());

        f.handler
            .handle(command(plan.id, BillingCycle::Monthly))
            .await
            .unwrap();

        let events = f.publisher.published_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "subscription.subscribed.v1");
        assert_eq!(events[0].payload["actor"]["id"], "user-1");
        assert_eq!(events[0].metadata.owner_id.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn publish_failure_keeps_subscription() {
        let plan = plan(0);
        let repo = Arc::new(MockSubscriptionRepository::new());
        let handler = SubscribeHandler::new(
            repo.clone(),
            Arc::new(MockPlanReader::with(vec![plan.clone()])),
            EventEmitter::new(Arc::new(MockEventPublisher::failing())),
            Arc::new(FixedClock::new(now())),
        );

        let result = handler.handle(command(plan.id, BillingCycle::Monthly)).await;

        assert!(result.is_ok());
        assert_eq!(repo.stored().len(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Failure Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unknown_plan_is_rejected() {
        let f = fixture(vec![], MockSubscriptionRepository::new());

        let result = f
            .handler
            .handle(command(PlanId::new(), BillingCycle::Monthly))
            .await;

        assert!(matches!(result, Err(SubscriptionError::PlanNotFound(_))));
        assert!(f.repo.stored().is_empty());
        assert!(f.publisher.published_events().is_empty());
    }

    #[tokio::test]
    async fn inactive_plan_is_rejected() {
        let mut plan = plan(0);
        plan.is_active = false;
        let f = fixture(vec![plan.clone()], MockSubscriptionRepository::new());

        let result = f.handler.handle(command(plan.id, BillingCycle::Monthly)).await;

        assert!(matches!(result, Err(SubscriptionError::PlanNotFound(_))));
    }

    #[tokio::test]
    async fn second_open_subscription_is_rejected() {
        let plan = plan(0);
        let existing = Subscription::start(owner("user-1"), &plan, BillingCycle::Monthly, now());
        let f = fixture(vec![plan.clone()], MockSubscriptionRepository::with(vec![existing]));

        let result = f.handler.handle(command(plan.id, BillingCycle::Yearly)).await;

        assert!(matches!(result, Err(SubscriptionError::AlreadySubscribed(_))));
        assert_eq!(f.repo.stored().len(), 1);
        assert!(f.repo.invoices().is_empty());
    }

    #[tokio::test]
    async fn expired_subscription_does_not_block() {
        let plan = plan(0);
        let mut existing =
            Subscription::start(owner("user-1"), &plan, BillingCycle::Monthly, now().minus_days(60));
        existing.expire(now().minus_days(30)).unwrap();
        let f = fixture(vec![plan.clone()], MockSubscriptionRepository::with(vec![existing]));

        let result = f.handler.handle(command(plan.id, BillingCycle::Monthly)).await;

        assert!(result.is_ok());
        assert_eq!(f.repo.stored().len(), 2);
    }

    #[tokio::test]
    async fn allow_multiple_skips_the_guard() {
        let plan = plan(0);
        let existing = Subscription::start(owner("user-1"), &plan, BillingCycle::Monthly, now());
        let repo = Arc::new(MockSubscriptionRepository::with(vec![existing]));
        let handler = SubscribeHandler::new(
            repo.clone(),
            Arc::new(MockPlanReader::with(vec![plan.clone()])),
            EventEmitter::new(Arc::new(MockEventPublisher::new())),
            Arc::new(FixedClock::new(now())),
        )
        .allow_multiple(true);

        handler
            .handle(command(plan.id, BillingCycle::Monthly))
            .await
            .unwrap();

        assert_eq!(repo.stored().len(), 2);
    }

    #[tokio::test]
    async fn storage_failure_emits_nothing() {
        let plan = plan(0);
        let f = fixture(vec![plan.clone()], MockSubscriptionRepository::failing_create());

        let result = f.handler.handle(command(plan.id, BillingCycle::Monthly)).await;

        assert!(matches!(result, Err(SubscriptionError::Infrastructure(_))));
        assert!(f.publisher.published_events().is_empty());
    }

    #[tokio::test]
    async fn cancelled_subscription_blocks_until_period_end() {
        let plan = plan(0);
        let mut existing =
            Subscription::start(owner("user-1"), &plan, BillingCycle::Monthly, now().minus_days(10));
        existing.cancel(now().minus_days(5)).unwrap();
        let f = fixture(vec![plan.clone()], MockSubscriptionRepository::with(vec![existing]));

        let result = f.handler.handle(command(plan.id, BillingCycle::Monthly)).await;

        assert!(matches!(result, Err(SubscriptionError::AlreadySubscribed(_))));
        assert!(f.publisher.published_events().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_subscribes_store_one_subscription() {
        let plan = plan(0);
        let store = Arc::new(InMemorySubscriptionStore::new());
        let publisher = Arc::new(MockEventPublisher::new());
        let handler = Arc::new(SubscribeHandler::new(
            store.clone(),
            Arc::new(MockPlanReader::with(vec![plan.clone()])),
            EventEmitter::new(publisher.clone()),
            Arc::new(FixedClock::new(now())),
        ));

        let attempts: Vec<_> = (0..8)
            .map(|_| {
                let handler = handler.clone();
                let plan_id = plan.id;
                tokio::spawn(async move { handler.handle(command(plan_id, BillingCycle::Monthly)).await })
            })
            .collect();

        let mut accepted = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(err) => assert!(matches!(err, SubscriptionError::AlreadySubscribed(_))),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(store.find_by_owner(&owner("user-1")).await.unwrap().len(), 1);
        assert_eq!(publisher.published_events().len(), 1);
    }
}
