//! Axum router configuration for subscription endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_subscription, get_current_subscription, list_subscriptions, renew_subscription,
    resume_subscription, subscribe, SubscriptionAppState,
};

/// Create the subscription API router.
///
/// # Routes
///
/// All routes act on the owner named in the `X-Owner-Id` header.
/// - `GET /` - Subscription history
/// - `GET /current` - Current subscription with invoices
/// - `POST /subscribe` - Start a subscription
/// - `POST /renew` - Extend the current subscription
/// - `POST /cancel` - Cancel the current subscription
/// - `POST /resume` - Reactivate the current subscription
pub fn subscription_routes() -> Router<SubscriptionAppState> {
    Router::new()
        .route("/", get(list_subscriptions))
        .route("/current", get(get_current_subscription))
        .route("/subscribe", post(subscribe))
        .route("/renew", post(renew_subscription))
        .route("/cancel", post(cancel_subscription))
        .route("/resume", post(resume_subscription))
}

/// Subscription routes mounted at `/subscriptions`.
pub fn subscription_router() -> Router<SubscriptionAppState> {
    Router::new().nest("/subscriptions", subscription_routes())
}
