//! Data Transfer Objects for subscription HTTP endpoints.
//!
//! These types define the JSON request/response shapes for the API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanId, Timestamp};
use crate::domain::subscription::{BillingCycle, Invoice, Subscription};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Deserialize)]
pub struct SubscribeRequest {
    pub plan_id: PlanId,
    pub billing_cycle: BillingCycle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenewRequest {
    /// Extend by a year instead of a month.
    #[serde(default)]
    pub annual: bool,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionView {
    pub id: String,
    pub owner_kind: String,
    pub owner_id: String,
    pub plan_id: String,
    pub status: String,
    pub billing_cycle: String,
    pub auto_renew: bool,
    pub is_active: bool,
    pub trial_ends_at: Option<Timestamp>,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Subscription> for SubscriptionView {
    fn from(s: &Subscription) -> Self {
        Self {
            id: s.id.to_string(),
            owner_kind: s.owner.kind.as_str().to_string(),
            owner_id: s.owner.id.to_string(),
            plan_id: s.plan_id.to_string(),
            status: s.status.as_str().to_string(),
            billing_cycle: s.billing_cycle.as_str().to_string(),
            auto_renew: s.auto_renew,
            is_active: s.is_active,
            trial_ends_at: s.trial_ends_at,
            started_at: s.started_at,
            ended_at: s.ended_at,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceView {
    pub id: String,
    pub invoice_id: String,
    pub status: String,
    pub currency: String,
    pub amount: i64,
    pub amount_paid: i64,
    pub description: String,
    pub due_date: NaiveDate,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&Invoice> for InvoiceView {
    fn from(i: &Invoice) -> Self {
        Self {
            id: i.id.to_string(),
            invoice_id: i.invoice_number.clone(),
            status: i.status.as_str().to_string(),
            currency: i.currency.clone(),
            amount: i.amount,
            amount_paid: i.amount_paid,
            description: i.description.clone(),
            due_date: i.due_date,
            paid_at: i.paid_at,
            created_at: i.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub subscription: SubscriptionView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeResponse {
    pub subscription: SubscriptionView,
    pub invoice: InvoiceView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentSubscriptionResponse {
    pub subscription: SubscriptionView,
    pub invoices: Vec<InvoiceView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionListResponse {
    pub subscriptions: Vec<SubscriptionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeResponse {
    pub subscription: SubscriptionView,
    /// The period end had already passed when the subscription was resumed.
    pub period_already_ended: bool,
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}
