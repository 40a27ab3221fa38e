//! Subscription Lifecycle - plan subscriptions, invoices and time-driven transitions
//!
//! This crate manages subscriptions to pricing plans: subscribing with a first
//! invoice, renewal, cancellation within a grace period, resumption, and the
//! periodic sweep that ends trials, expires lapsed periods and warns owners
//! ahead of renewal.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
