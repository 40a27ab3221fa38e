//! Configuration error types

use thiserror::Error;

/// Loading or validating the configuration failed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

/// A configuration value the service cannot run with.
///
/// Each variant names the offending setting by its environment variable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{key} is required when {required_by}")]
    Missing {
        key: &'static str,
        required_by: &'static str,
    },

    #[error("{key}={value} is not allowed: {reason}")]
    Rejected {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error(
        "sweep concurrency {concurrency} exceeds the {max_connections} pooled database connections"
    )]
    SweepExceedsPool {
        concurrency: usize,
        max_connections: u32,
    },
}

impl ValidationError {
    pub(crate) fn rejected(key: &'static str, value: impl ToString, reason: &'static str) -> Self {
        ValidationError::Rejected {
            key,
            value: value.to_string(),
            reason,
        }
    }

    /// Environment variable of the offending setting, when it is a single one.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            ValidationError::Missing { key, .. } | ValidationError::Rejected { key, .. } => Some(key),
            ValidationError::SweepExceedsPool { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_value_names_key_and_reason() {
        let err = ValidationError::rejected("SUBSCRIPTIONS__SERVER__PORT", 0, "port 0 cannot be bound");

        assert_eq!(err.key(), Some("SUBSCRIPTIONS__SERVER__PORT"));
        assert_eq!(
            err.to_string(),
            "SUBSCRIPTIONS__SERVER__PORT=0 is not allowed: port 0 cannot be bound"
        );
    }

    #[test]
    fn pool_mismatch_has_no_single_key() {
        let err = ValidationError::SweepExceedsPool {
            concurrency: 32,
            max_connections: 10,
        };

        assert_eq!(err.key(), None);
        assert!(err.to_string().contains("32"));
    }

    #[test]
    fn validation_errors_wrap_into_config_errors() {
        let err: ConfigError = ValidationError::Missing {
            key: "SUBSCRIPTIONS__DATABASE__URL",
            required_by: "migrations are enabled",
        }
        .into();

        assert!(err.to_string().starts_with("Invalid configuration: SUBSCRIPTIONS__DATABASE__URL"));
    }
}
