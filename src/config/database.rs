//! Storage backend configuration
//!
//! An empty URL keeps all subscriptions in process memory. A PostgreSQL URL
//! switches every port to the PostgreSQL adapters.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

const MAX_POOL_SIZE: u32 = 100;

/// Where subscriptions, invoices and plans are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    InMemory,
    Postgres,
}

/// PostgreSQL connection and pool settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub min_connections: u32,
    /// Upper bound for pooled connections; the sweep never runs wider than this
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    /// Apply `migrations/` before serving
    pub run_migrations: bool,
}

impl DatabaseConfig {
    pub fn backend(&self) -> StorageBackend {
        if self.url.trim().is_empty() {
            StorageBackend::InMemory
        } else {
            StorageBackend::Postgres
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend() == StorageBackend::Postgres
    }

    /// URL with the password replaced, safe for logs.
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        match rest.split_once('@') {
            Some((credentials, host)) => {
                let user = credentials.split(':').next().unwrap_or_default();
                format!("{}://{}:***@{}", scheme, user, host)
            }
            None => self.url.clone(),
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend() == StorageBackend::InMemory {
            return match self.run_migrations {
                true => Err(ValidationError::Missing {
                    key: "SUBSCRIPTIONS__DATABASE__URL",
                    required_by: "SUBSCRIPTIONS__DATABASE__RUN_MIGRATIONS is set",
                }),
                false => Ok(()),
            };
        }

        if !["postgres://", "postgresql://"]
            .iter()
            .any(|scheme| self.url.starts_with(scheme))
        {
            return Err(ValidationError::rejected(
                "SUBSCRIPTIONS__DATABASE__URL",
                self.redacted_url(),
                "only PostgreSQL URLs are supported",
            ));
        }
        if self.max_connections == 0 || self.max_connections > MAX_POOL_SIZE {
            return Err(ValidationError::rejected(
                "SUBSCRIPTIONS__DATABASE__MAX_CONNECTIONS",
                self.max_connections,
                "must be between 1 and 100",
            ));
        }
        if self.min_connections > self.max_connections {
            return Err(ValidationError::rejected(
                "SUBSCRIPTIONS__DATABASE__MIN_CONNECTIONS",
                self.min_connections,
                "exceeds max_connections",
            ));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            min_connections: 2,
            max_connections: 10,
            acquire_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1_800,
            run_migrations: false,
        }
    }
}
