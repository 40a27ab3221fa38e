//! Hand-written port mocks shared by the application tests.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::domain::foundation::{
    DomainError, ErrorCode, EventEnvelope, OwnerId, PlanId, Repository, SubscriptionId, Timestamp,
};
use crate::domain::plan::Plan;
use crate::domain::subscription::{Invoice, Owner, Subscription};
use crate::ports::{
    DenyReason, EventPublisher, FeatureUsage, InvoiceLedger, PlanReader, PolicyDecision, SubscriptionPolicy,
    SubscriptionRepository,
};

pub fn owner(id: &str) -> Owner {
    Owner::user(OwnerId::new(id).unwrap())
}

pub fn plan(trial_days: u32) -> Plan {
    Plan::new("Pro", 1_000, 10_000, "USD")
        .unwrap()
        .with_trial_days(trial_days)
        .unwrap()
}

// ════════════════════════════════════════════════════════════════════════════
// Subscription repository
// ════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
pub struct MockSubscriptionRepository {
    subscriptions: Mutex<Vec<Subscription>>,
    invoices: Mutex<Vec<Invoice>>,
    /// Updates of these subscriptions fail with a database error.
    failing_ids: Mutex<HashSet<SubscriptionId>>,
    /// Number of upcoming updates that report a version conflict.
    conflicts_remaining: Mutex<u32>,
    fail_create: bool,
    update_calls: Mutex<u32>,
}

impl MockSubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(subscriptions: Vec<Subscription>) -> Self {
        Self {
            subscriptions: Mutex::new(subscriptions),
            ..Self::default()
        }
    }

    pub fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    pub fn fail_updates_for(&self, id: SubscriptionId) {
        self.failing_ids.lock().unwrap().insert(id);
    }

    pub fn conflict_next(&self, times: u32) {
        *self.conflicts_remaining.lock().unwrap() = times;
    }

    /// Bump the stored version as if another writer had updated the row.
    pub fn touch(&self, id: SubscriptionId) {
        let mut subs = self.subscriptions.lock().unwrap();
        if let Some(s) = subs.iter_mut().find(|s| s.id == id) {
            s.version += 1;
        }
    }

    pub fn stored(&self) -> Vec<Subscription> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub fn stored_by_id(&self, id: SubscriptionId) -> Subscription {
        self.stored().into_iter().find(|s| s.id == id).unwrap()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.invoices.lock().unwrap().clone()
    }

    pub fn update_calls(&self) -> u32 {
        *self.update_calls.lock().unwrap()
    }
}

#[async_trait]
impl Repository<Subscription, SubscriptionId> for MockSubscriptionRepository {
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let subs = self.subscriptions.lock().unwrap();
        Ok(subs.iter().find(|s| &s.id == id && !s.is_deleted()).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Subscription>, DomainError> {
        let subs = self.subscriptions.lock().unwrap();
        Ok(subs.iter().filter(|s| !s.is_deleted()).cloned().collect())
    }

    async fn create(&self, entity: &Subscription) -> Result<(), DomainError> {
        self.subscriptions.lock().unwrap().push(entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &Subscription) -> Result<(), DomainError> {
        *self.update_calls.lock().unwrap() += 1;

        if self.failing_ids.lock().unwrap().contains(&entity.id) {
            return Err(DomainError::database("Simulated update failure"));
        }

        {
            let mut remaining = self.conflicts_remaining.lock().unwrap();
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DomainError::new(
                    ErrorCode::ConcurrentModification,
                    "Simulated version conflict",
                ));
            }
        }

        let mut subs = self.subscriptions.lock().unwrap();
        let stored = subs
            .iter_mut()
            .find(|s| s.id == entity.id)
            .ok_or_else(|| DomainError::new(ErrorCode::SubscriptionNotFound, "missing"))?;
        if stored.version != entity.version {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                "stale version",
            ));
        }
        *stored = entity.clone();
        stored.version += 1;
        Ok(())
    }

    async fn soft_delete(&self, id: &SubscriptionId) -> Result<(), DomainError> {
        let mut subs = self.subscriptions.lock().unwrap();
        if let Some(s) = subs.iter_mut().find(|s| &s.id == id) {
            s.soft_delete(Timestamp::now());
        }
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for MockSubscriptionRepository {
    async fn find_by_owner(&self, owner: &Owner) -> Result<Vec<Subscription>, DomainError> {
        let subs = self.subscriptions.lock().unwrap();
        let mut found: Vec<Subscription> = subs
            .iter()
            .filter(|s| &s.owner == owner && !s.is_deleted())
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn create_with_invoice(
        &self,
        subscription: &Subscription,
        invoice: &Invoice,
    ) -> Result<(), DomainError> {
        if self.fail_create {
            return Err(DomainError::database("Simulated insert failure"));
        }
        self.subscriptions.lock().unwrap().push(subscription.clone());
        self.invoices.lock().unwrap().push(invoice.clone());
        Ok(())
    }

    async fn create_exclusive_with_invoice(
        &self,
        subscription: &Subscription,
        invoice: &Invoice,
    ) -> Result<(), DomainError> {
        let holds_open = self.subscriptions.lock().unwrap().iter().any(|s| {
            s.owner == subscription.owner && !s.is_deleted() && s.is_open(subscription.created_at)
        });
        if holds_open {
            return Err(DomainError::new(ErrorCode::SubscriptionExists, "Owner already subscribed"));
        }
        self.create_with_invoice(subscription, invoice).await
    }
}

#[async_trait]
impl InvoiceLedger for MockSubscriptionRepository {
    async fn record(&self, invoice: &Invoice) -> Result<(), DomainError> {
        self.invoices.lock().unwrap().push(invoice.clone());
        Ok(())
    }

    async fn list_for_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Vec<Invoice>, DomainError> {
        let invoices = self.invoices.lock().unwrap();
        Ok(invoices
            .iter()
            .filter(|i| &i.subscription_id == subscription_id)
            .cloned()
            .collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Plan reader
// ════════════════════════════════════════════════════════════════════════════

pub struct MockPlanReader {
    plans: Vec<Plan>,
}

impl MockPlanReader {
    pub fn with(plans: Vec<Plan>) -> Self {
        Self { plans }
    }
}

#[async_trait]
impl PlanReader for MockPlanReader {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        Ok(self.plans.iter().find(|p| &p.id == id).cloned())
    }

    async fn list_active(&self) -> Result<Vec<Plan>, DomainError> {
        Ok(self.plans.iter().filter(|p| p.is_active).cloned().collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Event publisher
// ════════════════════════════════════════════════════════════════════════════

pub struct MockEventPublisher {
    published_events: Mutex<Vec<EventEnvelope>>,
    fail_publish: bool,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self {
            published_events: Mutex::new(Vec::new()),
            fail_publish: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            published_events: Mutex::new(Vec::new()),
            fail_publish: true,
        }
    }

    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published_events.lock().unwrap().clone()
    }

    pub fn event_types(&self) -> Vec<String> {
        self.published_events()
            .into_iter()
            .map(|e| e.event_type)
            .collect()
    }
}

#[async_trait]
impl EventPublisher for MockEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if self.fail_publish {
            return Err(DomainError::new(
                ErrorCode::EventPublishFailed,
                "Simulated publish failure",
            ));
        }
        self.published_events.lock().unwrap().push(event);
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Policy
// ════════════════════════════════════════════════════════════════════════════

pub struct MockPolicy {
    cancel: PolicyDecision,
}

impl MockPolicy {
    pub fn allowing() -> Self {
        Self {
            cancel: PolicyDecision::Allow,
        }
    }

    pub fn denying(reason: DenyReason) -> Self {
        Self {
            cancel: PolicyDecision::Deny(reason),
        }
    }
}

#[async_trait]
impl SubscriptionPolicy for MockPolicy {
    async fn can_cancel(&self, _owner: &Owner) -> Result<PolicyDecision, DomainError> {
        Ok(self.cancel.clone())
    }

    async fn is_active(&self, _owner: &Owner) -> Result<PolicyDecision, DomainError> {
        Ok(PolicyDecision::Allow)
    }

    async fn has_feature(
        &self,
        _owner: &Owner,
        _feature_key: &str,
        _usage: Option<&FeatureUsage>,
    ) -> Result<PolicyDecision, DomainError> {
        Ok(PolicyDecision::Allow)
    }

    async fn can_view_invoices(&self, _owner: &Owner) -> Result<PolicyDecision, DomainError> {
        Ok(PolicyDecision::Allow)
    }
}
