//! Subscription operation settings

use serde::Deserialize;

use super::error::ValidationError;

/// Settings for the owner-initiated operations.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionsConfig {
    /// Let an owner start a subscription while another one is still open
    #[serde(default)]
    pub allow_multiple: bool,

    /// Reload-and-retry attempts after a version conflict
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: u32,

    /// Days after the period start during which cancelling is allowed
    #[serde(default = "default_cancel_grace_days")]
    pub cancel_grace_days: i64,
}

impl SubscriptionsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cancel_grace_days < 0 {
            return Err(ValidationError::rejected(
                "SUBSCRIPTIONS__SUBSCRIPTIONS__CANCEL_GRACE_DAYS",
                self.cancel_grace_days,
                "grace period cannot be negative",
            ));
        }
        Ok(())
    }
}

impl Default for SubscriptionsConfig {
    fn default() -> Self {
        Self {
            allow_multiple: false,
            max_conflict_retries: default_max_conflict_retries(),
            cancel_grace_days: default_cancel_grace_days(),
        }
    }
}

fn default_max_conflict_retries() -> u32 {
    3
}

fn default_cancel_grace_days() -> i64 {
    14
}
