//! Load-modify-write of an owner's current subscription with retries on
//! version conflicts.

use crate::domain::foundation::Repository;
use crate::domain::subscription::{Owner, Subscription, SubscriptionError};
use crate::ports::SubscriptionRepository;

/// Apply `change` to the owner's current subscription and store it.
///
/// On a version conflict the subscription is reloaded and `change` applied
/// again, at most `max_retries` more times.
pub(super) async fn update_current<F>(
    repository: &dyn SubscriptionRepository,
    owner: &Owner,
    max_retries: u32,
    mut change: F,
) -> Result<Subscription, SubscriptionError>
where
    F: FnMut(&mut Subscription) -> Result<(), SubscriptionError> + Send,
{
    let mut attempt = 0;
    loop {
        let mut subscription = repository
            .find_current(owner)
            .await?
            .ok_or_else(|| SubscriptionError::not_found(owner.id.clone()))?;

        change(&mut subscription)?;

        match repository.update(&subscription).await {
            Ok(()) => {
                subscription.version += 1;
                return Ok(subscription);
            }
            Err(e) if e.is_conflict() && attempt < max_retries => {
                attempt += 1;
                tracing::debug!(
                    subscription_id = %subscription.id,
                    attempt,
                    "Version conflict, reloading subscription"
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
}
