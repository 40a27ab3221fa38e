//! In-memory subscription and invoice storage.
//!
//! Honors the same contract as the PostgreSQL adapter: compare-and-swap
//! updates on `version`, soft delete hiding rows from every query, and an
//! append-only invoice ledger.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, Repository, SubscriptionId, Timestamp};
use crate::domain::subscription::{Invoice, Owner, Subscription};
use crate::ports::{InvoiceLedger, SubscriptionRepository};

#[derive(Default)]
struct Tables {
    subscriptions: HashMap<SubscriptionId, Subscription>,
    invoices: Vec<Invoice>,
}

/// Subscriptions and invoices held behind one lock, so subscribe's two
/// inserts become visible together.
#[derive(Default)]
pub struct InMemorySubscriptionStore {
    tables: RwLock<Tables>,
}

impl InMemorySubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn not_found(id: &SubscriptionId) -> DomainError {
        DomainError::new(
            ErrorCode::SubscriptionNotFound,
            format!("Subscription not found: {}", id),
        )
    }
}

#[async_trait]
impl Repository<Subscription, SubscriptionId> for InMemorySubscriptionStore {
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .read()
            .subscriptions
            .get(id)
            .filter(|s| !s.is_deleted())
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<Subscription>, DomainError> {
        let mut all: Vec<Subscription> = self
            .read()
            .subscriptions
            .values()
            .filter(|s| !s.is_deleted())
            .cloned()
            .collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(all)
    }

    async fn create(&self, entity: &Subscription) -> Result<(), DomainError> {
        let mut tables = self.write();
        if tables.subscriptions.contains_key(&entity.id) {
            return Err(DomainError::new(
                ErrorCode::SubscriptionExists,
                format!("Subscription already stored: {}", entity.id),
            ));
        }
        tables.subscriptions.insert(entity.id, entity.clone());
        Ok(())
    }

    async fn update(&self, entity: &Subscription) -> Result<(), DomainError> {
        let mut tables = self.write();
        let stored = tables
            .subscriptions
            .get_mut(&entity.id)
            .filter(|s| !s.is_deleted())
            .ok_or_else(|| Self::not_found(&entity.id))?;

        if stored.version != entity.version {
            return Err(DomainError::new(
                ErrorCode::ConcurrentModification,
                format!(
                    "Subscription {} was modified concurrently (expected version {}, found {})",
                    entity.id, entity.version, stored.version
                ),
            ));
        }

        *stored = entity.clone();
        stored.version = entity.version + 1;
        Ok(())
    }

    async fn soft_delete(&self, id: &SubscriptionId) -> Result<(), DomainError> {
        let mut tables = self.write();
        let stored = tables
            .subscriptions
            .get_mut(id)
            .filter(|s| !s.is_deleted())
            .ok_or_else(|| Self::not_found(id))?;
        stored.soft_delete(Timestamp::now());
        stored.version += 1;
        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionStore {
    async fn find_by_owner(&self, owner: &Owner) -> Result<Vec<Subscription>, DomainError> {
        let mut found: Vec<Subscription> = self
            .read()
            .subscriptions
            .values()
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
        insert_with_invoice(&mut self.write(), subscription, invoice)
    }

    async fn create_exclusive_with_invoice(
        &self,
        subscription: &Subscription,
        invoice: &Invoice,
    ) -> Result<(), DomainError> {
        let mut tables = self.write();
        let holds_open = tables.subscriptions.values().any(|s| {
            s.owner == subscription.owner && !s.is_deleted() && s.is_open(subscription.created_at)
        });
        if holds_open {
            return Err(DomainError::new(
                ErrorCode::SubscriptionExists,
                format!("Owner {} already holds an open subscription", subscription.owner.id),
            ));
        }
        insert_with_invoice(&mut tables, subscription, invoice)
    }
}

fn insert_with_invoice(
    tables: &mut Tables,
    subscription: &Subscription,
    invoice: &Invoice,
) -> Result<(), DomainError> {
    if tables.subscriptions.contains_key(&subscription.id) {
        return Err(DomainError::new(
            ErrorCode::SubscriptionExists,
            format!("Subscription already stored: {}", subscription.id),
        ));
    }
    if tables
        .invoices
        .iter()
        .any(|i| i.invoice_number == invoice.invoice_number)
    {
        return Err(DomainError::database(format!(
            "Duplicate invoice number: {}",
            invoice.invoice_number
        )));
    }
    tables.subscriptions.insert(subscription.id, subscription.clone());
    tables.invoices.push(invoice.clone());
    Ok(())
}

#[async_trait]
impl InvoiceLedger for InMemorySubscriptionStore {
    async fn record(&self, invoice: &Invoice) -> Result<(), DomainError> {
        let mut tables = self.write();
        if tables
            .invoices
            .iter()
            .any(|i| i.invoice_number == invoice.invoice_number)
        {
            return Err(DomainError::database(format!(
                "Duplicate invoice number: {}",
                invoice.invoice_number
            )));
        }
        tables.invoices.push(invoice.clone());
        Ok(())
    }

    async fn list_for_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Vec<Invoice>, DomainError> {
        Ok(self
            .read()
            .invoices
            .iter()
            .filter(|i| &i.subscription_id == subscription_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::OwnerId;
    use crate::domain::plan::Plan;
    use crate::domain::subscription::{BillingCycle, SubscriptionStatus};

    fn owner(id: &str) -> Owner {
        Owner::user(OwnerId::new(id).unwrap())
    }

    fn subscription(user: &str, now: Timestamp) -> (Subscription, Invoice) {
        let plan = Plan::new("Pro", 1_000, 10_000, "USD").unwrap();
        let sub = Subscription::start(owner(user), &plan, BillingCycle::Monthly, now);
        let invoice = Invoice::first_for(&sub, &plan, now);
        (sub, invoice)
    }

    #[tokio::test]
    async fn create_with_invoice_stores_both() {
        let store = InMemorySubscriptionStore::new();
        let (sub, invoice) = subscription("u-1", Timestamp::now());

        store.create_with_invoice(&sub, &invoice).await.unwrap();

        assert_eq!(store.find_by_id(&sub.id).await.unwrap(), Some(sub.clone()));
        assert_eq!(store.list_for_subscription(&sub.id).await.unwrap(), vec![invoice]);
    }

    #[tokio::test]
    async fn update_bumps_version() {
        let store = InMemorySubscriptionStore::new();
        let (mut sub, invoice) = subscription("u-1", Timestamp::now());
        store.create_with_invoice(&sub, &invoice).await.unwrap();

        sub.cancel(Timestamp::now()).unwrap();
        store.update(&sub).await.unwrap();

        let stored = store.find_by_id(&sub.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.status, SubscriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn stale_update_is_rejected() {
        let store = InMemorySubscriptionStore::new();
        let (sub, invoice) = subscription("u-1", Timestamp::now());
        store.create_with_invoice(&sub, &invoice).await.unwrap();

        let mut first = sub.clone();
        let mut second = sub.clone();
        first.cancel(Timestamp::now()).unwrap();
        second.expire(Timestamp::now()).unwrap();

        store.update(&first).await.unwrap();
        let err = store.update(&second).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::ConcurrentModification);
        let stored = store.find_by_id(&sub.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SubscriptionStatus::Cancelled);
    }

    #[tokio::test]
    async fn update_of_unknown_subscription_fails() {
        let store = InMemorySubscriptionStore::new();
        let (sub, _) = subscription("u-1", Timestamp::now());

        let err = store.update(&sub).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::SubscriptionNotFound);
    }

    #[tokio::test]
    async fn find_by_owner_is_newest_first() {
        let store = InMemorySubscriptionStore::new();
        let now = Timestamp::now();
        let (old, old_invoice) = subscription("u-1", now.minus_days(40));
        let (new, new_invoice) = subscription("u-1", now);
        let (other, other_invoice) = subscription("u-2", now);
        store.create_with_invoice(&old, &old_invoice).await.unwrap();
        store.create_with_invoice(&new, &new_invoice).await.unwrap();
        store.create_with_invoice(&other, &other_invoice).await.unwrap();

        let found = store.find_by_owner(&owner("u-1")).await.unwrap();

        assert_eq!(found.iter().map(|s| s.id).collect::<Vec<_>>(), vec![new.id, old.id]);
        assert_eq!(store.find_current(&owner("u-1")).await.unwrap().unwrap().id, new.id);
    }

    #[tokio::test]
    async fn soft_deleted_rows_disappear_but_invoices_stay() {
        let store = InMemorySubscriptionStore::new();
        let (sub, invoice) = subscription("u-1", Timestamp::now());
        store.create_with_invoice(&sub, &invoice).await.unwrap();

        store.soft_delete(&sub.id).await.unwrap();

        assert!(store.find_by_id(&sub.id).await.unwrap().is_none());
        assert!(store.find_all().await.unwrap().is_empty());
        assert!(store.find_by_owner(&owner("u-1")).await.unwrap().is_empty());
        assert_eq!(store.list_for_subscription(&sub.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_invoice_number_rolls_back_both() {
        let store = InMemorySubscriptionStore::new();
        let (first, invoice) = subscription("u-1", Timestamp::now());
        store.create_with_invoice(&first, &invoice).await.unwrap();

        let (second, mut clash) = subscription("u-2", Timestamp::now());
        clash.invoice_number = invoice.invoice_number.clone();
        let result = store.create_with_invoice(&second, &clash).await;

        assert!(result.is_err());
        assert!(store.find_by_id(&second.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn exclusive_create_refuses_second_open_subscription() {
        let store = InMemorySubscriptionStore::new();
        let now = Timestamp::now();
        let (first, first_invoice) = subscription("u-1", now);
        store.create_exclusive_with_invoice(&first, &first_invoice).await.unwrap();

        let (second, second_invoice) = subscription("u-1", now);
        let err = store
            .create_exclusive_with_invoice(&second, &second_invoice)
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::SubscriptionExists);
        assert!(store.find_by_id(&second.id).await.unwrap().is_none());
        assert!(store.list_for_subscription(&second.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn exclusive_create_allows_after_expiry_and_for_other_owners() {
        let store = InMemorySubscriptionStore::new();
        let now = Timestamp::now();
        let (mut old, old_invoice) = subscription("u-1", now.minus_days(40));
        store.create_with_invoice(&old, &old_invoice).await.unwrap();
        old.expire(now.minus_days(10)).unwrap();
        store.update(&old).await.unwrap();

        let (renewed, renewed_invoice) = subscription("u-1", now);
        let (other, other_invoice) = subscription("u-2", now);
        store.create_exclusive_with_invoice(&renewed, &renewed_invoice).await.unwrap();
        store.create_exclusive_with_invoice(&other, &other_invoice).await.unwrap();

        assert_eq!(store.find_by_owner(&owner("u-1")).await.unwrap().len(), 2);
    }
}
