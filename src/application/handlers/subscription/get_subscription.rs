//! GetSubscriptionHandler - Query handler for an owner's current subscription.

use std::sync::Arc;

use crate::domain::subscription::{Invoice, Owner, Subscription, SubscriptionError};
use crate::ports::{InvoiceLedger, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct GetSubscriptionQuery {
    pub owner: Owner,
}

#[derive(Debug, Clone)]
pub struct GetSubscriptionResult {
    pub subscription: Subscription,
    /// Oldest first.
    pub invoices: Vec<Invoice>,
}

pub struct GetSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    invoices: Arc<dyn InvoiceLedger>,
}

impl GetSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        invoices: Arc<dyn InvoiceLedger>,
    ) -> Self {
        Self {
            subscriptions,
            invoices,
        }
    }

    pub async fn handle(
        &self,
        query: GetSubscriptionQuery,
    ) -> Result<GetSubscriptionResult, SubscriptionError> {
        let subscription = self
            .subscriptions
            .find_current(&query.owner)
            .await?
            .ok_or_else(|| SubscriptionError::not_found(query.owner.id.clone()))?;

        let invoices = self.invoices.list_for_subscription(&subscription.id).await?;

        Ok(GetSubscriptionResult {
            subscription,
            invoices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{owner, plan, MockSubscriptionRepository};
    use crate::domain::foundation::Timestamp;
    use crate::domain::subscription::BillingCycle;

    #[tokio::test]
    async fn returns_newest_subscription_with_its_invoices() {
        let plan = plan(0);
        let now = Timestamp::now();
        let older = Subscription::start(owner("user-1"), &plan, BillingCycle::Monthly, now.minus_days(60));
        let newer = Subscription::start(owner("user-1"), &plan, BillingCycle::Yearly, now);
        let repo = Arc::new(MockSubscriptionRepository::new());
        repo.create_with_invoice(&older, &Invoice::first_for(&older, &plan, now.minus_days(60)))
            .await
            .unwrap();
        repo.create_with_invoice(&newer, &Invoice::first_for(&newer, &plan, now))
            .await
            .unwrap();
        let handler = GetSubscriptionHandler::new(repo.clone(), repo);

        let result = handler
            .handle(GetSubscriptionQuery {
                owner: owner("user-1"),
            })
            .await
            .unwrap();

        assert_eq!(result.subscription.id, newer.id);
        assert_eq!(result.invoices.len(), 1);
        assert_eq!(result.invoices[0].subscription_id, newer.id);
    }

    #[tokio::test]
    async fn other_owners_subscription_is_not_visible() {
        let sub = Subscription::start(owner("user-2"), &plan(0), BillingCycle::Monthly, Timestamp::now());
        let repo = Arc::new(MockSubscriptionRepository::with(vec![sub]));
        let handler = GetSubscriptionHandler::new(repo.clone(), repo);

        let result = handler
            .handle(GetSubscriptionQuery {
                owner: owner("user-1"),
            })
            .await;

        assert!(matches!(result, Err(SubscriptionError::NotFound(_))));
    }
}
