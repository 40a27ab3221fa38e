//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, events)
//! - `plan` - Pricing plans and the features they grant
//! - `subscription` - Subscription aggregate, lifecycle rules, invoices and events

pub mod foundation;
pub mod plan;
pub mod subscription;
