//! PostgreSQL implementation of PlanReader.
//!
//! Plans are read together with their feature associations.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, FeatureId, PlanId};
use crate::domain::plan::{Feature, Plan, PlanFeature};
use crate::ports::PlanReader;

pub struct PostgresPlanReader {
    pool: PgPool,
}

impl PostgresPlanReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn features_for(&self, plan_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<PlanFeature>>, DomainError> {
        let rows: Vec<PlanFeatureRow> = sqlx::query_as(
            r#"
            SELECT pf.plan_id, f.id AS feature_id, f.key, f.is_active,
                   pf.is_enabled, pf.value, pf.model
            FROM plan_features pf
            JOIN features f ON f.id = pf.feature_id
            WHERE pf.plan_id = ANY($1)
            ORDER BY f.key ASC
            "#,
        )
        .bind(plan_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to load plan features: {}", e))
        })?;

        let mut by_plan: HashMap<Uuid, Vec<PlanFeature>> = HashMap::new();
        for row in rows {
            let plan_id = row.plan_id;
            by_plan.entry(plan_id).or_default().push(row.into());
        }
        Ok(by_plan)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PlanRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    monthly_price: i64,
    yearly_price: i64,
    first_time_discount: Option<i64>,
    currency: String,
    trial_days: i32,
    is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct PlanFeatureRow {
    plan_id: Uuid,
    feature_id: Uuid,
    key: String,
    is_active: bool,
    is_enabled: bool,
    value: Option<i64>,
    model: Option<String>,
}

impl From<PlanFeatureRow> for PlanFeature {
    fn from(row: PlanFeatureRow) -> Self {
        PlanFeature {
            feature: Feature {
                id: FeatureId::from_uuid(row.feature_id),
                key: row.key,
                is_active: row.is_active,
            },
            is_enabled: row.is_enabled,
            value: row.value,
            model: row.model,
        }
    }
}

impl PlanRow {
    fn into_plan(self, features: Vec<PlanFeature>) -> Result<Plan, DomainError> {
        let invalid_trial = |id: Uuid, days: i32| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid trial_days for plan {}: {}", id, days),
            )
        };
        let (id, raw_trial_days) = (self.id, self.trial_days);
        let trial_days = u32::try_from(raw_trial_days).map_err(|_| invalid_trial(id, raw_trial_days))?;

        let plan = Plan {
            id: PlanId::from_uuid(self.id),
            name: self.name,
            description: self.description,
            monthly_price: self.monthly_price,
            yearly_price: self.yearly_price,
            first_time_discount: self.first_time_discount,
            currency: self.currency,
            trial_days: 0,
            is_active: self.is_active,
            features,
        };
        plan.with_trial_days(trial_days)
            .map_err(|_| invalid_trial(id, raw_trial_days))
    }
}

const PLAN_COLUMNS: &str = "id, name, description, monthly_price, yearly_price, \
     first_time_discount, currency, trial_days, is_active";

#[async_trait]
impl PlanReader for PostgresPlanReader {
    async fn find_by_id(&self, id: &PlanId) -> Result<Option<Plan>, DomainError> {
        let row: Option<PlanRow> =
            sqlx::query_as(&format!("SELECT {} FROM plans WHERE id = $1", PLAN_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(ErrorCode::DatabaseError, format!("Failed to find plan: {}", e))
                })?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut features = self.features_for(&[row.id]).await?;
        let plan_features = features.remove(&row.id).unwrap_or_default();
        row.into_plan(plan_features).map(Some)
    }

    async fn list_active(&self) -> Result<Vec<Plan>, DomainError> {
        let rows: Vec<PlanRow> = sqlx::query_as(&format!(
            "SELECT {} FROM plans WHERE is_active ORDER BY name ASC",
            PLAN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list plans: {}", e))
        })?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut features = self.features_for(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let plan_features = features.remove(&row.id).unwrap_or_default();
                row.into_plan(plan_features)
            })
            .collect()
    }
}
