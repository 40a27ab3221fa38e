//! Plan aggregate.
//!
//! # Design Decisions
//!
//! - **Money in minor units**: prices are i64 cents, never floats
//! - **Trial by plan**: a plan with `trial_days > 0` starts subscribers in trial

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PlanId, ValidationError};
use crate::domain::subscription::BillingCycle;

use super::PlanFeature;

/// Longest trial a plan may offer.
const MAX_TRIAL_DAYS: i64 = 365;

/// A pricing plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub description: Option<String>,
    /// Price per 30-day period, minor units.
    pub monthly_price: i64,
    /// Price per 365-day period, minor units.
    pub yearly_price: i64,
    /// Advertised first-time discount, minor units. Catalog data only; invoices
    /// bill the list price.
    pub first_time_discount: Option<i64>,
    /// ISO 4217 code, upper case.
    pub currency: String,
    pub trial_days: u32,
    pub is_active: bool,
    pub features: Vec<PlanFeature>,
}

impl Plan {
    /// Create an active plan without trial, discount or features.
    ///
    /// # Errors
    ///
    /// Returns error if the name is blank, a price is negative, or the
    /// currency is not a three-letter code.
    pub fn new(
        name: impl Into<String>,
        monthly_price: i64,
        yearly_price: i64,
        currency: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if monthly_price < 0 {
            return Err(ValidationError::out_of_range("monthly_price", 0, i64::MAX, monthly_price));
        }
        if yearly_price < 0 {
            return Err(ValidationError::out_of_range("yearly_price", 0, i64::MAX, yearly_price));
        }
        let currency = currency.into().trim().to_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                format!("'{}' is not an ISO 4217 code", currency),
            ));
        }

        Ok(Self {
            id: PlanId::new(),
            name,
            description: None,
            monthly_price,
            yearly_price,
            first_time_discount: None,
            currency,
            trial_days: 0,
            is_active: true,
            features: Vec::new(),
        })
    }

    /// Set the number of trial days.
    pub fn with_trial_days(mut self, days: u32) -> Result<Self, ValidationError> {
        if i64::from(days) > MAX_TRIAL_DAYS {
            return Err(ValidationError::out_of_range(
                "trial_days",
                0,
                MAX_TRIAL_DAYS,
                i64::from(days),
            ));
        }
        self.trial_days = days;
        Ok(self)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_first_time_discount(mut self, discount: i64) -> Self {
        self.first_time_discount = Some(discount.max(0));
        self
    }

    pub fn with_feature(mut self, feature: PlanFeature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn has_trial(&self) -> bool {
        self.trial_days > 0
    }

    /// List price for one period of the given cycle.
    pub fn price_for(&self, cycle: BillingCycle) -> i64 {
        match cycle {
            BillingCycle::Monthly => self.monthly_price,
            BillingCycle::Yearly => self.yearly_price,
        }
    }

    /// Association for the given feature key, if the plan lists it.
    pub fn feature(&self, key: &str) -> Option<&PlanFeature> {
        self.features.iter().find(|pf| pf.key() == key)
    }
}
