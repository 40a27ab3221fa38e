//! PostgreSQL implementation of SubscriptionRepository and InvoiceLedger.
//!
//! Every update is a compare-and-swap on the `version` column. Subscribe's
//! subscription and invoice inserts share one transaction; the exclusive
//! variant also holds a per-owner advisory lock while it checks for an open
//! subscription.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgPool, Postgres};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::foundation::{
    DomainError, ErrorCode, InvoiceId, OwnerId, PlanId, Repository, SubscriptionId, Timestamp,
};
use crate::domain::subscription::{
    BillingCycle, Invoice, InvoiceStatus, Owner, OwnerKind, Subscription, SubscriptionStatus,
};
use crate::ports::{InvoiceLedger, SubscriptionRepository};

const SUBSCRIPTION_COLUMNS: &str = "id, owner_kind, owner_id, plan_id, status, billing_cycle, \
     auto_renew, is_active, trial_ends_at, started_at, ended_at, version, created_at, \
     updated_at, deleted_at";

/// PostgreSQL implementation of the subscription storage ports.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn is_live(&self, id: &SubscriptionId) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to check subscription", e))
    }
}

/// Database row representation of a subscription.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    owner_kind: String,
    owner_id: String,
    plan_id: Uuid,
    status: String,
    billing_cycle: String,
    auto_renew: bool,
    is_active: bool,
    trial_ends_at: Option<DateTime<Utc>>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        let kind = OwnerKind::from_str(&row.owner_kind).map_err(corrupt)?;
        let owner_id = OwnerId::new(row.owner_id).map_err(corrupt)?;

        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            owner: Owner::new(kind, owner_id),
            plan_id: PlanId::from_uuid(row.plan_id),
            status: SubscriptionStatus::from_str(&row.status).map_err(corrupt)?,
            billing_cycle: BillingCycle::from_str(&row.billing_cycle).map_err(corrupt)?,
            auto_renew: row.auto_renew,
            is_active: row.is_active,
            trial_ends_at: row.trial_ends_at.map(Timestamp::from_datetime),
            started_at: Timestamp::from_datetime(row.started_at),
            ended_at: row.ended_at.map(Timestamp::from_datetime),
            version: row.version,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
            deleted_at: row.deleted_at.map(Timestamp::from_datetime),
        })
    }
}

/// Database row representation of an invoice.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: Uuid,
    subscription_id: Uuid,
    invoice_id: String,
    status: String,
    currency: String,
    amount: i64,
    amount_paid: i64,
    description: String,
    due_date: NaiveDate,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DomainError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        Ok(Invoice {
            id: InvoiceId::from_uuid(row.id),
            subscription_id: SubscriptionId::from_uuid(row.subscription_id),
            invoice_number: row.invoice_id,
            status: InvoiceStatus::from_str(&row.status).map_err(corrupt)?,
            currency: row.currency,
            amount: row.amount,
            amount_paid: row.amount_paid,
            description: row.description,
            due_date: row.due_date,
            paid_at: row.paid_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn corrupt(e: impl std::fmt::Display) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Invalid stored value: {}", e))
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn map_insert_error(e: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some("subscriptions_pkey") {
            return DomainError::new(ErrorCode::SubscriptionExists, "Subscription already exists");
        }
    }
    db_error("Failed to insert subscription", e)
}

async fn insert_subscription<'e, E>(executor: E, sub: &Subscription) -> Result<(), DomainError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO subscriptions (
            id, owner_kind, owner_id, plan_id, status, billing_cycle, auto_renew, is_active,
            trial_ends_at, started_at, ended_at, version, created_at, updated_at, deleted_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(sub.id.as_uuid())
    .bind(sub.owner.kind.as_str())
    .bind(sub.owner.id.as_str())
    .bind(sub.plan_id.as_uuid())
    .bind(sub.status.as_str())
    .bind(sub.billing_cycle.as_str())
    .bind(sub.auto_renew)
    .bind(sub.is_active)
    .bind(sub.trial_ends_at.map(|t| *t.as_datetime()))
    .bind(sub.started_at.as_datetime())
    .bind(sub.ended_at.map(|t| *t.as_datetime()))
    .bind(sub.version)
    .bind(sub.created_at.as_datetime())
    .bind(sub.updated_at.as_datetime())
    .bind(sub.deleted_at.map(|t| *t.as_datetime()))
    .execute(executor)
    .await
    .map_err(map_insert_error)?;

    Ok(())
}

async fn insert_invoice<'e, E>(executor: E, invoice: &Invoice) -> Result<(), DomainError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO subscription_invoices (
            id, subscription_id, invoice_id, status, currency, amount, amount_paid,
            description, due_date, paid_at, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(invoice.id.as_uuid())
    .bind(invoice.subscription_id.as_uuid())
    .bind(&invoice.invoice_number)
    .bind(invoice.status.as_str())
    .bind(&invoice.currency)
    .bind(invoice.amount)
    .bind(invoice.amount_paid)
    .bind(&invoice.description)
    .bind(invoice.due_date)
    .bind(invoice.paid_at.map(|t| *t.as_datetime()))
    .bind(invoice.created_at.as_datetime())
    .bind(invoice.updated_at.as_datetime())
    .execute(executor)
    .await
    .map_err(|e| db_error("Failed to insert invoice", e))?;

    Ok(())
}

#[async_trait]
impl Repository<Subscription, SubscriptionId> for PostgresSubscriptionRepository {
    async fn find_by_id(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE id = $1 AND deleted_at IS NULL",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find subscription", e))?;

        row.map(Subscription::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions WHERE deleted_at IS NULL ORDER BY created_at ASC",
            SUBSCRIPTION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list subscriptions", e))?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn create(&self, entity: &Subscription) -> Result<(), DomainError> {
        insert_subscription(&self.pool, entity).await
    }

    async fn update(&self, entity: &Subscription) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                plan_id = $3,
                status = $4,
                billing_cycle = $5,
                auto_renew = $6,
                is_active = $7,
                trial_ends_at = $8,
                started_at = $9,
                ended_at = $10,
                updated_at = $11,
                version = version + 1
            WHERE id = $1 AND version = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(entity.id.as_uuid())
        .bind(entity.version)
        .bind(entity.plan_id.as_uuid())
        .bind(entity.status.as_str())
        .bind(entity.billing_cycle.as_str())
        .bind(entity.auto_renew)
        .bind(entity.is_active)
        .bind(entity.trial_ends_at.map(|t| *t.as_datetime()))
        .bind(entity.started_at.as_datetime())
        .bind(entity.ended_at.map(|t| *t.as_datetime()))
        .bind(entity.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update subscription", e))?;

        if result.rows_affected() == 0 {
            if self.is_live(&entity.id).await? {
                return Err(DomainError::new(
                    ErrorCode::ConcurrentModification,
                    format!(
                        "Subscription {} was modified concurrently (expected version {})",
                        entity.id, entity.version
                    ),
                ));
            }
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription not found: {}", entity.id),
            ));
        }

        Ok(())
    }

    async fn soft_delete(&self, id: &SubscriptionId) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions SET
                deleted_at = NOW(),
                updated_at = NOW(),
                version = version + 1
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to delete subscription", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription not found: {}", id),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_by_owner(&self, owner: &Owner) -> Result<Vec<Subscription>, DomainError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscriptions \
             WHERE owner_kind = $1 AND owner_id = $2 AND deleted_at IS NULL \
             ORDER BY created_at DESC",
            SUBSCRIPTION_COLUMNS
        ))
        .bind(owner.kind.as_str())
        .bind(owner.id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find subscriptions by owner", e))?;

        rows.into_iter().map(Subscription::try_from).collect()
    }

    async fn create_with_invoice(
        &self,
        subscription: &Subscription,
        invoice: &Invoice,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        insert_subscription(&mut *tx, subscription).await?;
        insert_invoice(&mut *tx, invoice).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn create_exclusive_with_invoice(
        &self,
        subscription: &Subscription,
        invoice: &Invoice,
    ) -> Result<(), DomainError> {
        let owner = &subscription.owner;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        // Serializes subscribes per owner until commit or rollback.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(owner_lock_key(owner))
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to lock owner", e))?;

        let holds_open: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM subscriptions
                WHERE owner_kind = $1 AND owner_id = $2 AND deleted_at IS NULL
                  AND (status IN ('trial', 'pending', 'active')
                       OR (status = 'cancelled' AND (ended_at IS NULL OR ended_at > $3)))
            )
            "#,
        )
        .bind(owner.kind.as_str())
        .bind(owner.id.as_str())
        .bind(subscription.created_at.as_datetime())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to check open subscriptions", e))?;

        if holds_open {
            return Err(DomainError::new(
                ErrorCode::SubscriptionExists,
                format!("Owner {} already holds an open subscription", owner.id),
            ));
        }

        insert_subscription(&mut *tx, subscription).await?;
        insert_invoice(&mut *tx, invoice).await?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit transaction", e))?;

        Ok(())
    }
}

fn owner_lock_key(owner: &Owner) -> String {
    format!("subscriptions:{}:{}", owner.kind.as_str(), owner.id)
}

#[async_trait]
impl InvoiceLedger for PostgresSubscriptionRepository {
    async fn record(&self, invoice: &Invoice) -> Result<(), DomainError> {
        insert_invoice(&self.pool, invoice).await
    }

    async fn list_for_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> Result<Vec<Invoice>, DomainError> {
        let rows: Vec<InvoiceRow> = sqlx::query_as(
            r#"
            SELECT id, subscription_id, invoice_id, status, currency, amount, amount_paid,
                   description, due_date, paid_at, created_at, updated_at
            FROM subscription_invoices
            WHERE subscription_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(subscription_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list invoices", e))?;

        rows.into_iter().map(Invoice::try_from).collect()
    }
}
