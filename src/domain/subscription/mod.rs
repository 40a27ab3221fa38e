//! Subscription domain module.
//!
//! The subscription aggregate, its status state machine, the reconciliation
//! rules used by the lifecycle sweep, invoices and the events emitted along
//! the way.

mod aggregate;
mod billing_cycle;
mod errors;
mod events;
mod invoice;
mod owner;
mod reconcile;
mod status;

pub use aggregate::Subscription;
pub use billing_cycle::BillingCycle;
pub use errors::SubscriptionError;
pub use events::{
    Subscribed, SubscriptionExpired, SubscriptionWarning, TrialEnded, Unsubscribed,
};
pub use invoice::{Invoice, InvoiceStatus};
pub use owner::{Owner, OwnerKind};
pub use reconcile::LifecycleAction;
pub use status::SubscriptionStatus;
