//! Base repository trait for persistence operations.
//!
//! `Repository<T, ID>` is the storage contract shared by aggregate
//! repositories. Aggregate-specific ports extend it with their own queries
//! instead of re-declaring CRUD signatures.
//!
//! # Example
//!
//! ```ignore
//! #[async_trait]
//! pub trait SubscriptionRepository: Repository<Subscription, SubscriptionId> {
//!     async fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Subscription>, DomainError>;
//! }
//! ```

use async_trait::async_trait;
use std::fmt::Debug;

use super::DomainError;

/// Base trait for aggregate repositories.
///
/// # Error Handling
///
/// All methods return `Result<_, DomainError>`. Implementations convert
/// adapter-specific errors into `DatabaseError`, missing rows on update into
/// the aggregate's not-found code, and stale writes into
/// `ConcurrentModification`.
#[async_trait]
pub trait Repository<T, ID>: Send + Sync
where
    T: Send + Sync,
    ID: Send + Sync + Debug + 'static,
{
    /// Finds an aggregate by its unique identifier.
    ///
    /// Soft-deleted aggregates are not returned.
    async fn find_by_id(&self, id: &ID) -> Result<Option<T>, DomainError>;

    /// Returns every aggregate that has not been soft-deleted.
    async fn find_all(&self) -> Result<Vec<T>, DomainError>;

    /// Persists a new aggregate.
    async fn create(&self, entity: &T) -> Result<(), DomainError>;

    /// Updates an existing aggregate.
    ///
    /// Implementations with row versions must reject stale writes.
    async fn update(&self, entity: &T) -> Result<(), DomainError>;

    /// Logically deletes an aggregate; the row is kept.
    async fn soft_delete(&self, id: &ID) -> Result<(), DomainError>;

    /// Checks if an aggregate with the given ID exists.
    async fn exists(&self, id: &ID) -> Result<bool, DomainError> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}
