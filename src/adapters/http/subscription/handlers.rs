//! HTTP handlers for subscription endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Json, Request, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::de::DeserializeOwned;

use crate::application::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, EventEmitter, GetSubscriptionHandler,
    GetSubscriptionQuery, ListSubscriptionsHandler, ListSubscriptionsQuery,
    RenewSubscriptionCommand, RenewSubscriptionHandler, ResumeSubscriptionCommand,
    ResumeSubscriptionHandler, SubscribeCommand, SubscribeHandler,
};
use crate::domain::foundation::{DomainError, OwnerId};
use crate::domain::subscription::{Owner, OwnerKind, SubscriptionError};
use crate::ports::{Clock, InvoiceLedger, PlanReader, SubscriptionPolicy, SubscriptionRepository};

use super::dto::{
    CurrentSubscriptionResponse, ErrorResponse, InvoiceView, RenewRequest, ResumeResponse,
    SubscribeRequest, SubscribeResponse, SubscriptionListResponse, SubscriptionResponse,
    SubscriptionView,
};

pub const OWNER_HEADER: &str = "X-Owner-Id";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
#[derive(Clone)]
pub struct SubscriptionAppState {
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub plans: Arc<dyn PlanReader>,
    pub invoices: Arc<dyn InvoiceLedger>,
    pub policy: Arc<dyn SubscriptionPolicy>,
    pub emitter: EventEmitter,
    pub clock: Arc<dyn Clock>,
    /// Deployment-wide kind of the owner named in `X-Owner-Id`.
    pub owner_kind: OwnerKind,
    pub allow_multiple: bool,
    pub max_conflict_retries: u32,
}

impl SubscriptionAppState {
    pub fn subscribe_handler(&self) -> SubscribeHandler {
        SubscribeHandler::new(
            self.subscriptions.clone(),
            self.plans.clone(),
            self.emitter.clone(),
            self.clock.clone(),
        )
        .allow_multiple(self.allow_multiple)
    }

    pub fn renew_handler(&self) -> RenewSubscriptionHandler {
        RenewSubscriptionHandler::new(
            self.subscriptions.clone(),
            self.clock.clone(),
            self.max_conflict_retries,
        )
    }

    pub fn cancel_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(
            self.subscriptions.clone(),
            self.policy.clone(),
            self.emitter.clone(),
            self.clock.clone(),
            self.max_conflict_retries,
        )
    }

    pub fn resume_handler(&self) -> ResumeSubscriptionHandler {
        ResumeSubscriptionHandler::new(
            self.subscriptions.clone(),
            self.clock.clone(),
            self.max_conflict_retries,
        )
    }

    pub fn get_handler(&self) -> GetSubscriptionHandler {
        GetSubscriptionHandler::new(self.subscriptions.clone(), self.invoices.clone())
    }

    pub fn list_handler(&self) -> ListSubscriptionsHandler {
        ListSubscriptionsHandler::new(self.subscriptions.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Owner extraction
// ════════════════════════════════════════════════════════════════════════════════

/// Acting owner, read from the `X-Owner-Id` header.
#[derive(Debug, Clone)]
pub struct ActingOwner(pub Owner);

pub struct OwnerRequired;

impl IntoResponse for OwnerRequired {
    fn into_response(self) -> Response {
        let error = ErrorResponse::new(
            "OWNER_REQUIRED",
            format!("A valid {} header is required", OWNER_HEADER),
        );
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

#[axum::async_trait]
impl FromRequestParts<SubscriptionAppState> for ActingOwner {
    type Rejection = OwnerRequired;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SubscriptionAppState,
    ) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(OWNER_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| OwnerId::new(s).ok())
            .ok_or(OwnerRequired)?;

        Ok(ActingOwner(Owner::new(state.owner_kind, id)))
    }
}

/// JSON request body whose rejections answer with the API error shape.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = SubscriptionApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(SubscriptionApiError(SubscriptionError::validation(
                "body",
                rejection.body_text(),
            ))),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Query Handlers (GET endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// GET /subscriptions - Subscription history, newest first
pub async fn list_subscriptions(
    State(state): State<SubscriptionAppState>,
    ActingOwner(owner): ActingOwner,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let result = state
        .list_handler()
        .handle(ListSubscriptionsQuery { owner })
        .await?;

    Ok(Json(SubscriptionListResponse {
        subscriptions: result.subscriptions.iter().map(SubscriptionView::from).collect(),
    }))
}

/// GET /subscriptions/current - Current subscription with its invoices
pub async fn get_current_subscription(
    State(state): State<SubscriptionAppState>,
    ActingOwner(owner): ActingOwner,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let result = state
        .get_handler()
        .handle(GetSubscriptionQuery { owner })
        .await?;

    Ok(Json(CurrentSubscriptionResponse {
        subscription: SubscriptionView::from(&result.subscription),
        invoices: result.invoices.iter().map(InvoiceView::from).collect(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Command Handlers (POST endpoints)
// ════════════════════════════════════════════════════════════════════════════════

/// POST /subscriptions/subscribe - Start a subscription
pub async fn subscribe(
    State(state): State<SubscriptionAppState>,
    ActingOwner(owner): ActingOwner,
    JsonBody(request): JsonBody<SubscribeRequest>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let result = state
        .subscribe_handler()
        .handle(SubscribeCommand {
            owner,
            plan_id: request.plan_id,
            billing_cycle: request.billing_cycle,
        })
        .await?;

    let response = SubscribeResponse {
        subscription: SubscriptionView::from(&result.subscription),
        invoice: InvoiceView::from(&result.invoice),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /subscriptions/renew - Extend the current subscription
pub async fn renew_subscription(
    State(state): State<SubscriptionAppState>,
    ActingOwner(owner): ActingOwner,
    JsonBody(request): JsonBody<RenewRequest>,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let result = state
        .renew_handler()
        .handle(RenewSubscriptionCommand {
            owner,
            annual: request.annual,
        })
        .await?;

    Ok(Json(SubscriptionResponse {
        subscription: SubscriptionView::from(&result.subscription),
    }))
}

/// POST /subscriptions/cancel - Cancel the current subscription
pub async fn cancel_subscription(
    State(state): State<SubscriptionAppState>,
    ActingOwner(owner): ActingOwner,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let result = state
        .cancel_handler()
        .handle(CancelSubscriptionCommand { owner })
        .await?;

    Ok(Json(SubscriptionResponse {
        subscription: SubscriptionView::from(&result.subscription),
    }))
}

/// POST /subscriptions/resume - Reactivate the current subscription
pub async fn resume_subscription(
    State(state): State<SubscriptionAppState>,
    ActingOwner(owner): ActingOwner,
) -> Result<impl IntoResponse, SubscriptionApiError> {
    let result = state
        .resume_handler()
        .handle(ResumeSubscriptionCommand { owner })
        .await?;

    Ok(Json(ResumeResponse {
        subscription: SubscriptionView::from(&result.subscription),
        period_already_ended: result.period_already_ended,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper that converts subscription errors into HTTP responses.
#[derive(Debug)]
pub struct SubscriptionApiError(SubscriptionError);

impl From<SubscriptionError> for SubscriptionApiError {
    fn from(err: SubscriptionError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for SubscriptionApiError {
    fn from(err: DomainError) -> Self {
        Self(SubscriptionError::from(err))
    }
}

impl IntoResponse for SubscriptionApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self.0 {
            SubscriptionError::NotFound(_) => (StatusCode::NOT_FOUND, "SUBSCRIPTION_NOT_FOUND"),
            SubscriptionError::PlanNotFound(_) => (StatusCode::NOT_FOUND, "PLAN_NOT_FOUND"),
            SubscriptionError::Denied { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            SubscriptionError::ValidationFailed { .. } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILED")
            }
            SubscriptionError::AlreadySubscribed(_) => (StatusCode::CONFLICT, "SUBSCRIPTION_EXISTS"),
            SubscriptionError::InvalidState { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_STATE_TRANSITION")
            }
            SubscriptionError::Conflict(_) => (StatusCode::CONFLICT, "CONCURRENT_MODIFICATION"),
            SubscriptionError::Infrastructure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        let message = match &self.0 {
            SubscriptionError::Infrastructure(detail) => {
                tracing::error!(error = %detail, "Subscription request failed");
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}
