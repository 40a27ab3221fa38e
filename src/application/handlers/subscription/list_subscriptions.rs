//! ListSubscriptionsHandler - Query handler for an owner's subscription history.

use std::sync::Arc;

use crate::domain::subscription::{Owner, Subscription, SubscriptionError};
use crate::ports::SubscriptionRepository;

#[derive(Debug, Clone)]
pub struct ListSubscriptionsQuery {
    pub owner: Owner,
}

#[derive(Debug, Clone)]
pub struct ListSubscriptionsResult {
    /// Newest first. Soft-deleted subscriptions are left out.
    pub subscriptions: Vec<Subscription>,
}

pub struct ListSubscriptionsHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
}

impl ListSubscriptionsHandler {
    pub fn new(subscriptions: Arc<dyn SubscriptionRepository>) -> Self {
        Self { subscriptions }
    }

    pub async fn handle(
        &self,
        query: ListSubscriptionsQuery,
    ) -> Result<ListSubscriptionsResult, SubscriptionError> {
        let subscriptions = self.subscriptions.find_by_owner(&query.owner).await?;
        Ok(ListSubscriptionsResult { subscriptions })
    }
}
