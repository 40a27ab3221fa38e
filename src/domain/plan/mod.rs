//! Plan domain module.
//!
//! Pricing plans and the features they grant. Plans are reference data
//! administered elsewhere; this crate only reads them.

mod feature;
mod aggregate;

pub use feature::{Feature, PlanFeature};
pub use aggregate::Plan;
