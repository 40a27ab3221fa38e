//! Invoice ledger port.
//!
//! Append-only: invoices are recorded and listed, never updated or removed
//! by this crate.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, SubscriptionId};
use crate::domain::subscription::Invoice;

#[async_trait]
pub trait InvoiceLedger: Send + Sync {
    /// Append an invoice.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if the invoice number is already taken
    /// - `DatabaseError` on persistence failure
    async fn record(&self, invoice: &Invoice) -> Result<(), DomainError>;

    /// Invoices of one subscription, oldest first.
    async fn list_for_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Vec<Invoice>, DomainError>;
}
