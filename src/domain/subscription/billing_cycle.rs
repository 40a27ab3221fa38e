//! Billing cycle definitions.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Recurrence unit governing the length of a billing period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    /// 30-day period.
    Monthly,
    /// 365-day period.
    Yearly,
}

impl BillingCycle {
    /// Length of one billing period in days.
    pub fn period_days(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 30,
            BillingCycle::Yearly => 365,
        }
    }

    /// How many days before `ended_at` renewal warnings start.
    pub fn warning_window_days(&self) -> i64 {
        match self {
            BillingCycle::Monthly => 7,
            BillingCycle::Yearly => 30,
        }
    }

    /// Cycle used by renewals, which only know whether they are annual.
    pub fn from_annual(annual: bool) -> Self {
        if annual {
            BillingCycle::Yearly
        } else {
            BillingCycle::Monthly
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }
}

impl FromStr for BillingCycle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(BillingCycle::Monthly),
            "yearly" => Ok(BillingCycle::Yearly),
            other => Err(ValidationError::invalid_format(
                "billing_cycle",
                format!("'{}' is not one of: monthly, yearly", other),
            )),
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
