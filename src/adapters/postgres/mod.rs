//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionRepository` - Subscriptions (compare-and-swap updates) and the invoice ledger
//! - `PostgresPlanReader` - Plans with their feature associations

mod plan_reader;
mod subscription_repository;

pub use plan_reader::PostgresPlanReader;
pub use subscription_repository::PostgresSubscriptionRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseConfig;
use crate::domain::foundation::{DomainError, ErrorCode};

/// Open a connection pool and optionally apply the bundled migrations.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .connect(&config.url)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to connect: {}", e))
        })?;

    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Migration failed: {}", e))
        })?;
        tracing::info!("Database migrations applied");
    }

    Ok(pool)
}
