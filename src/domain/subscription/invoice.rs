//! Subscription invoices.
//!
//! Invoices are an append-only internal ledger. One is issued when a
//! subscription is created; nothing here charges money.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{InvoiceId, SubscriptionId, Timestamp, ValidationError};
use crate::domain::plan::Plan;

use super::Subscription;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Open,
    Paid,
    Void,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Open => "open",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Void => "void",
        }
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(InvoiceStatus::Open),
            "paid" => Ok(InvoiceStatus::Paid),
            "void" => Ok(InvoiceStatus::Void),
            other => Err(ValidationError::invalid_format(
                "invoice_status",
                format!("unknown invoice status '{}'", other),
            )),
        }
    }
}

/// An amount billed to a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub subscription_id: SubscriptionId,
    /// Externally visible number, `INV-YYYYMMDD-XXXXXXXX`.
    pub invoice_number: String,
    pub status: InvoiceStatus,
    pub currency: String,
    /// Minor units.
    pub amount: i64,
    pub amount_paid: i64,
    pub description: String,
    pub due_date: NaiveDate,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Invoice {
    /// First invoice for a newly started subscription.
    ///
    /// Bills the plan's list price for the subscription's cycle, due when
    /// the paid period starts.
    pub fn first_for(subscription: &Subscription, plan: &Plan, now: Timestamp) -> Self {
        Self {
            id: InvoiceId::new(),
            subscription_id: subscription.id,
            invoice_number: Self::generate_number(now),
            status: InvoiceStatus::Open,
            currency: plan.currency.clone(),
            amount: plan.price_for(subscription.billing_cycle),
            amount_paid: 0,
            description: plan.name.clone(),
            due_date: subscription.started_at.date(),
            paid_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Issue date plus eight hex characters of a random UUID.
    pub fn generate_number(now: Timestamp) -> String {
        let simple = Uuid::new_v4().simple().to_string();
        format!(
            "INV-{}-{}",
            now.date().format("%Y%m%d"),
            simple[..8].to_uppercase()
        )
    }

    pub fn balance_due(&self) -> i64 {
        (self.amount - self.amount_paid).max(0)
    }
}
