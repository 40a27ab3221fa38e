//! Policy answering cancel and entitlement questions from stored
//! subscription state.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::subscription::{Owner, Subscription, SubscriptionStatus};
use crate::ports::{
    Clock, DenyReason, FeatureUsage, InvoiceLedger, PlanReader, PolicyDecision, SubscriptionPolicy,
    SubscriptionRepository,
};

pub const DEFAULT_CANCEL_GRACE_DAYS: i64 = 14;

/// Cancellation is allowed within a grace window after the paid period
/// started. Entitlements come from the plan of the owner's current
/// subscription.
pub struct GracePeriodPolicy {
    subscriptions: Arc<dyn SubscriptionRepository>,
    plans: Arc<dyn PlanReader>,
    invoices: Arc<dyn InvoiceLedger>,
    clock: Arc<dyn Clock>,
    cancel_grace_days: i64,
}

impl GracePeriodPolicy {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        plans: Arc<dyn PlanReader>,
        invoices: Arc<dyn InvoiceLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            plans,
            invoices,
            clock,
            cancel_grace_days: DEFAULT_CANCEL_GRACE_DAYS,
        }
    }

    pub fn with_cancel_grace_days(mut self, days: i64) -> Self {
        self.cancel_grace_days = days;
        self
    }

    fn on_grace_period(&self, subscription: &Subscription) -> bool {
        let now = self.clock.now();
        let cancellable_status = matches!(
            subscription.status,
            SubscriptionStatus::Active | SubscriptionStatus::Trial
        );
        let period_open = subscription.ended_at.map(|end| now <= end).unwrap_or(true);
        let within_grace = now <= subscription.started_at.add_days(self.cancel_grace_days);

        cancellable_status && period_open && within_grace
    }
}

#[async_trait]
impl SubscriptionPolicy for GracePeriodPolicy {
    async fn can_cancel(&self, owner: &Owner) -> Result<PolicyDecision, DomainError> {
        let Some(subscription) = self.subscriptions.find_current(owner).await? else {
            return Ok(PolicyDecision::Deny(DenyReason::NoSubscription));
        };

        if !self.on_grace_period(&subscription) {
            return Ok(PolicyDecision::Deny(DenyReason::OutsideGracePeriod));
        }

        Ok(PolicyDecision::Allow)
    }

    async fn is_active(&self, owner: &Owner) -> Result<PolicyDecision, DomainError> {
        Ok(match self.subscriptions.find_current(owner).await? {
            Some(s) if s.status == SubscriptionStatus::Active => PolicyDecision::Allow,
            Some(_) => PolicyDecision::Deny(DenyReason::NotActive),
            None => PolicyDecision::Deny(DenyReason::NoSubscription),
        })
    }

    async fn has_feature(
        &self,
        owner: &Owner,
        feature_key: &str,
        usage: Option<&FeatureUsage>,
    ) -> Result<PolicyDecision, DomainError> {
        let Some(subscription) = self.subscriptions.find_current(owner).await? else {
            return Ok(PolicyDecision::Deny(DenyReason::NoSubscription));
        };

        if subscription.is_expired() {
            return Ok(PolicyDecision::Deny(DenyReason::SubscriptionExpired));
        }

        let not_included = || {
            PolicyDecision::Deny(DenyReason::FeatureNotIncluded {
                feature: feature_key.to_string(),
            })
        };

        let Some(plan) = self.plans.find_by_id(&subscription.plan_id).await? else {
            return Ok(not_included());
        };
        let Some(plan_feature) = plan.feature(feature_key) else {
            return Ok(not_included());
        };

        if !plan_feature.is_enabled || !plan_feature.feature.is_active {
            return Ok(PolicyDecision::Deny(DenyReason::FeatureDisabled {
                feature: feature_key.to_string(),
            }));
        }

        if let (Some(usage), Some(model)) = (usage, plan_feature.model.as_deref()) {
            if usage.model == model && plan_feature.limit_reached(usage.count) {
                return Ok(PolicyDecision::Deny(DenyReason::LimitReached {
                    feature: feature_key.to_string(),
                    current: usage.count,
                    max: plan_feature.value.unwrap_or(0),
                }));
            }
        }

        Ok(PolicyDecision::Allow)
    }

    async fn can_view_invoices(&self, owner: &Owner) -> Result<PolicyDecision, DomainError> {
        let Some(subscription) = self.subscriptions.find_current(owner).await? else {
            return Ok(PolicyDecision::Deny(DenyReason::NoSubscription));
        };

        if self
            .invoices
            .list_for_subscription(&subscription.id)
            .await?
            .is_empty()
        {
            return Ok(PolicyDecision::Deny(DenyReason::NoInvoices));
        }

        Ok(PolicyDecision::Allow)
    }
}
