//! HTTP listener and process-wide settings

use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

use super::error::ValidationError;

/// Longest a single API request may run before the timeout layer answers 408.
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Where the API listens and how the process reports what it does.
///
/// The sweep-only modes ignore the listener fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_level: String,

    /// Log line format; JSON in production, human-readable elsewhere
    pub log_format: Option<LogFormat>,

    pub request_timeout_secs: u64,
}

/// Deployment stage.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Shape of emitted log lines.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl ServerConfig {
    /// Listener address.
    ///
    /// # Errors
    ///
    /// Returns `Rejected` when host and port do not form a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| {
            ValidationError::rejected("SUBSCRIPTIONS__SERVER__HOST", addr, "not a socket address")
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Configured log format, or the environment's default.
    pub fn log_format(&self) -> LogFormat {
        self.log_format.unwrap_or(if self.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::rejected(
                "SUBSCRIPTIONS__SERVER__PORT",
                self.port,
                "port 0 cannot be bound",
            ));
        }
        if !(1..=MAX_REQUEST_TIMEOUT_SECS).contains(&self.request_timeout_secs) {
            return Err(ValidationError::rejected(
                "SUBSCRIPTIONS__SERVER__REQUEST_TIMEOUT_SECS",
                self.request_timeout_secs,
                "must be between 1 and 300 seconds",
            ));
        }
        self.socket_addr().map(|_| ())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: Environment::Development,
            log_level: "info,subscription_lifecycle=debug,sqlx=warn".to_string(),
            log_format: None,
            request_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(port: u16, timeout: u64) -> ServerConfig {
        ServerConfig {
            port,
            request_timeout_secs: timeout,
            ..Default::default()
        }
    }

    #[test]
    fn default_listener_is_valid() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn log_format_follows_environment_unless_set() {
        let mut config = ServerConfig::default();
        assert_eq!(config.log_format(), LogFormat::Pretty);

        config.environment = Environment::Production;
        assert_eq!(config.log_format(), LogFormat::Json);

        config.log_format = Some(LogFormat::Pretty);
        assert_eq!(config.log_format(), LogFormat::Pretty);
    }

    #[test]
    fn rejected_settings_name_their_variable() {
        let cases = [
            (server(0, 30), "SUBSCRIPTIONS__SERVER__PORT"),
            (server(8080, 0), "SUBSCRIPTIONS__SERVER__REQUEST_TIMEOUT_SECS"),
            (server(8080, 301), "SUBSCRIPTIONS__SERVER__REQUEST_TIMEOUT_SECS"),
            (
                ServerConfig {
                    host: "not a host".to_string(),
                    ..Default::default()
                },
                "SUBSCRIPTIONS__SERVER__HOST",
            ),
        ];

        for (config, key) in cases {
            assert_eq!(config.validate().unwrap_err().key(), Some(key));
        }
    }
}
