//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `SUBSCRIPTIONS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use subscription_lifecycle::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Sweeping every {:?}", config.lifecycle.sweep_interval());
//! ```

mod database;
mod error;
mod lifecycle;
mod ownership;
mod server;
mod subscriptions;

pub use database::{DatabaseConfig, StorageBackend};
pub use error::{ConfigError, ValidationError};
pub use lifecycle::LifecycleConfig;
pub use ownership::OwnershipConfig;
pub use server::{Environment, LogFormat, ServerConfig};
pub use subscriptions::SubscriptionsConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields an
/// in-memory deployment for users with a daily sweep.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Owner kind shared by all subscriptions
    #[serde(default)]
    pub ownership: OwnershipConfig,

    /// Subscribe, renew, cancel and resume settings
    #[serde(default)]
    pub subscriptions: SubscriptionsConfig,

    /// Lifecycle sweep schedule
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `SUBSCRIPTIONS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `SUBSCRIPTIONS__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `SUBSCRIPTIONS__OWNERSHIP__OWNER_KIND=team` -> `ownership.owner_kind = team`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUBSCRIPTIONS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.subscriptions.validate()?;
        self.lifecycle.validate()?;

        // Each concurrent sweep task holds a pooled connection while it updates
        if self.database.backend() == StorageBackend::Postgres
            && self.lifecycle.concurrency > self.database.max_connections as usize
        {
            return Err(ValidationError::SweepExceedsPool {
                concurrency: self.lifecycle.concurrency,
                max_connections: self.database.max_connections,
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
