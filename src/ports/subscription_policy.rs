//! Authorization and entitlement port.
//!
//! Answers questions about what an owner may do, based on the state of
//! their current subscription. The cancel operation consults `can_cancel`;
//! the other checks are offered to the surrounding application.
//!
//! # Example
//!
//! ```ignore
//! match policy.has_feature(&owner, "projects", Some(&FeatureUsage::new("Project", 3))).await? {
//!     PolicyDecision::Allow => { /* create project */ }
//!     PolicyDecision::Deny(reason) => return Err(SubscriptionError::denied(reason.to_string())),
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::DomainError;
use crate::domain::subscription::Owner;

#[async_trait]
pub trait SubscriptionPolicy: Send + Sync {
    /// Whether the owner may cancel their current subscription now.
    async fn can_cancel(&self, owner: &Owner) -> Result<PolicyDecision, DomainError>;

    /// Whether the owner's current subscription is active.
    async fn is_active(&self, owner: &Owner) -> Result<PolicyDecision, DomainError>;

    /// Whether the owner's plan grants `feature_key`.
    ///
    /// With `usage`, a metered association bound to the same model also
    /// requires `usage.count` to be below its limit.
    async fn has_feature(
        &self,
        owner: &Owner,
        feature_key: &str,
        usage: Option<&FeatureUsage>,
    ) -> Result<PolicyDecision, DomainError>;

    /// Whether the owner has invoices to look at.
    async fn can_view_invoices(&self, owner: &Owner) -> Result<PolicyDecision, DomainError>;
}

/// Records of `model` the owner already has, counted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureUsage {
    pub model: String,
    pub count: i64,
}

impl FeatureUsage {
    pub fn new(model: impl Into<String>, count: i64) -> Self {
        Self {
            model: model.into(),
            count,
        }
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    Deny(DenyReason),
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, PolicyDecision::Allow)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, PolicyDecision::Deny(_))
    }

    /// Converts the decision to a Result type, with deny becoming an error.
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            PolicyDecision::Allow => Ok(()),
            PolicyDecision::Deny(reason) => Err(reason),
        }
    }
}

/// Reason a policy check was denied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DenyReason {
    /// Owner holds no subscription.
    NoSubscription,

    /// Subscription exists but is not active.
    NotActive,

    /// Cancellation window has closed.
    OutsideGracePeriod,

    SubscriptionExpired,

    /// Plan does not list the feature.
    FeatureNotIncluded { feature: String },

    /// Plan lists the feature but the association is switched off.
    FeatureDisabled { feature: String },

    LimitReached { feature: String, current: i64, max: i64 },

    NoInvoices,
}

impl DenyReason {
    /// User-facing message.
    pub fn user_message(&self) -> String {
        match self {
            DenyReason::NoSubscription | DenyReason::NotActive => {
                "You do not have an active subscription.".to_string()
            }
            DenyReason::OutsideGracePeriod => "You cannot cancel your subscription.".to_string(),
            DenyReason::SubscriptionExpired => "You cannot access this feature.".to_string(),
            DenyReason::FeatureNotIncluded { .. } | DenyReason::FeatureDisabled { .. } => {
                "You do not have access to this feature.".to_string()
            }
            DenyReason::LimitReached { .. } => {
                "You have reached your limit for this feature.".to_string()
            }
            DenyReason::NoInvoices => "You do not have any invoices.".to_string(),
        }
    }
}

impl std::fmt::Display for DenyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}
