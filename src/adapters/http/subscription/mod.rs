//! Subscription HTTP adapter.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CurrentSubscriptionResponse, ErrorResponse, InvoiceView, RenewRequest, ResumeResponse,
    SubscribeRequest, SubscribeResponse, SubscriptionListResponse, SubscriptionResponse,
    SubscriptionView,
};
pub use handlers::{ActingOwner, JsonBody, SubscriptionApiError, SubscriptionAppState, OWNER_HEADER};
pub use routes::{subscription_router, subscription_routes};
