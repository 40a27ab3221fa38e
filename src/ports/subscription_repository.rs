//! Subscription repository port.
//!
//! Persists Subscription aggregates. Extends the generic `Repository`
//! contract with owner lookups and the atomic subscribe writes.
//!
//! # Design
//!
//! - **Compare-and-swap updates**: `update` succeeds only when the stored
//!   `version` equals the aggregate's and bumps it by one; otherwise it fails
//!   with `ConcurrentModification` and writes nothing
//! - **Soft delete**: deleted rows are invisible to every finder
//!
//! # Example
//!
//! ```ignore
//! let mut subscription = repo
//!     .find_current(&owner)
//!     .await?
//!     .ok_or_else(|| SubscriptionError::not_found(owner.id.clone()))?;
//! subscription.resume(clock.now())?;
//! repo.update(&subscription).await?;
//! ```

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Repository, SubscriptionId};
use crate::domain::subscription::{Invoice, Owner, Subscription};

#[async_trait]
pub trait SubscriptionRepository: Repository<Subscription, SubscriptionId> {
    /// All subscriptions of an owner, newest first.
    async fn find_by_owner(&self, owner: &Owner) -> Result<Vec<Subscription>, DomainError>;

    /// The owner's most recent subscription, the one operations act on.
    async fn find_current(&self, owner: &Owner) -> Result<Option<Subscription>, DomainError> {
        Ok(self.find_by_owner(owner).await?.into_iter().next())
    }

    /// Store a new subscription together with its first invoice.
    ///
    /// Both rows are written or neither is.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure (nothing is stored)
    async fn create_with_invoice(
        &self,
        subscription: &Subscription,
        invoice: &Invoice,
    ) -> Result<(), DomainError>;

    /// Like `create_with_invoice`, but only while the owner holds no open
    /// subscription as of `subscription.created_at`.
    ///
    /// The check and both writes are one atomic step, so concurrent calls
    /// for the same owner store at most one subscription.
    ///
    /// # Errors
    ///
    /// - `SubscriptionExists` if the owner already holds an open subscription
    /// - `DatabaseError` on persistence failure (nothing is stored)
    async fn create_exclusive_with_invoice(
        &self,
        subscription: &Subscription,
        invoice: &Invoice,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn SubscriptionRepository) {}
}
