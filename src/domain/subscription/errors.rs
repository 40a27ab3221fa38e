//! Subscription-specific error types.
//!
//! Errors surfaced by the subscription operations. Adapter failures arrive
//! as `DomainError` and are converted here.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, OwnerId, PlanId, ValidationError};

/// Errors that can occur during subscription operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// The owner holds no subscription.
    #[error("No subscription found for owner: {0}")]
    NotFound(OwnerId),

    /// Plan does not exist or is not offered anymore.
    #[error("Plan not found: {0}")]
    PlanNotFound(PlanId),

    /// Policy refused the operation.
    #[error("{reason}")]
    Denied { reason: String },

    #[error("Validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    /// Owner already holds an open subscription.
    #[error("Owner already has an open subscription: {0}")]
    AlreadySubscribed(OwnerId),

    #[error("Cannot {attempted} subscription in {current} state")]
    InvalidState { current: String, attempted: String },

    /// Another writer updated the subscription first.
    #[error("Subscription was modified concurrently: {0}")]
    Conflict(String),

    #[error("Infrastructure error: {0}")]
    Infrastructure(String),
}

impl SubscriptionError {
    pub fn not_found(owner: OwnerId) -> Self {
        SubscriptionError::NotFound(owner)
    }

    pub fn plan_not_found(plan_id: PlanId) -> Self {
        SubscriptionError::PlanNotFound(plan_id)
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        SubscriptionError::Denied {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SubscriptionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn already_subscribed(owner: OwnerId) -> Self {
        SubscriptionError::AlreadySubscribed(owner)
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        SubscriptionError::Infrastructure(message.into())
    }

    /// Maps to the shared error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SubscriptionError::NotFound(_) => ErrorCode::SubscriptionNotFound,
            SubscriptionError::PlanNotFound(_) => ErrorCode::PlanNotFound,
            SubscriptionError::Denied { .. } => ErrorCode::Forbidden,
            SubscriptionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SubscriptionError::AlreadySubscribed(_) => ErrorCode::SubscriptionExists,
            SubscriptionError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            SubscriptionError::Conflict(_) => ErrorCode::ConcurrentModification,
            SubscriptionError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SubscriptionError::Conflict(_) | SubscriptionError::Infrastructure(_)
        )
    }
}

impl From<DomainError> for SubscriptionError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ConcurrentModification => SubscriptionError::Conflict(err.message),
            ErrorCode::InvalidStateTransition => SubscriptionError::InvalidState {
                current: err
                    .details
                    .get("from")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                attempted: err
                    .details
                    .get("to")
                    .map(|to| format!("move to {}", to))
                    .unwrap_or_else(|| "transition".to_string()),
            },
            ErrorCode::ValidationFailed => SubscriptionError::ValidationFailed {
                field: err
                    .details
                    .get("field")
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string()),
                message: err.message,
            },
            ErrorCode::Forbidden => SubscriptionError::Denied {
                reason: err.message,
            },
            _ => SubscriptionError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for SubscriptionError {
    fn from(err: ValidationError) -> Self {
        SubscriptionError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<SubscriptionError> for DomainError {
    fn from(err: SubscriptionError) -> Self {
        DomainError::new(err.code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::StateMachine;
    use crate::domain::subscription::SubscriptionStatus;

    fn owner_id() -> OwnerId {
        OwnerId::new("user-test-123").unwrap()
    }

    // ============================================================
    // Codes
    // ============================================================

    #[test]
    fn not_found_maps_to_subscription_not_found() {
        let err = SubscriptionError::not_found(owner_id());
        assert_eq!(err.code(), ErrorCode::SubscriptionNotFound);
        assert!(err.to_string().contains("user-test-123"));
    }

    #[test]
    fn denied_displays_reason_only() {
        let err = SubscriptionError::denied("You cannot cancel your subscription.");
        assert_eq!(err.to_string(), "You cannot cancel your subscription.");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[test]
    fn already_subscribed_maps_to_exists() {
        let err = SubscriptionError::already_subscribed(owner_id());
        assert_eq!(err.code(), ErrorCode::SubscriptionExists);
    }

    #[test]
    fn only_conflict_and_infrastructure_are_retryable() {
        assert!(SubscriptionError::Conflict("x".into()).is_retryable());
        assert!(SubscriptionError::infrastructure("db down").is_retryable());
        assert!(!SubscriptionError::denied("no").is_retryable());
        assert!(!SubscriptionError::not_found(owner_id()).is_retryable());
    }

    // ============================================================
    // Conversions
    // ============================================================

    #[test]
    fn concurrent_modification_becomes_conflict() {
        let err: SubscriptionError =
            DomainError::new(ErrorCode::ConcurrentModification, "stale version").into();
        assert_eq!(err, SubscriptionError::Conflict("stale version".to_string()));
    }

    #[test]
    fn invalid_transition_keeps_states() {
        let domain = SubscriptionStatus::Pending
            .transition_to(SubscriptionStatus::Cancelled)
            .unwrap_err();
        let err: SubscriptionError = domain.into();
        assert!(matches!(
            err,
            SubscriptionError::InvalidState { ref current, .. } if current == "Pending"
        ));
    }

    #[test]
    fn validation_keeps_field() {
        let domain: DomainError = ValidationError::empty_field("plan_id").into();
        let err: SubscriptionError = domain.into();
        assert!(matches!(
            err,
            SubscriptionError::ValidationFailed { ref field, .. } if field == "plan_id"
        ));
    }

    #[test]
    fn database_error_becomes_infrastructure() {
        let err: SubscriptionError = DomainError::database("connection reset").into();
        assert!(matches!(err, SubscriptionError::Infrastructure(_)));
    }

    #[test]
    fn round_trips_code_into_domain_error() {
        let domain: DomainError = SubscriptionError::denied("no").into();
        assert_eq!(domain.code, ErrorCode::Forbidden);
    }
}
