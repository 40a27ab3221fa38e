//! Features and their per-plan association.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::FeatureId;

/// A capability that plans can grant, identified by a stable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub key: String,
    pub is_active: bool,
}

impl Feature {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            id: FeatureId::new(),
            key: key.into(),
            is_active: true,
        }
    }

    pub fn activate(&mut self) {
        self.is_active = true;
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
    }
}

/// A feature as attached to one plan.
///
/// Metered features carry a usage limit in `value` and the name of the
/// model whose records count against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanFeature {
    pub feature: Feature,
    pub is_enabled: bool,
    /// Usage limit. None = unlimited.
    pub value: Option<i64>,
    pub model: Option<String>,
}

impl PlanFeature {
    /// An enabled, unmetered association.
    pub fn enabled(feature: Feature) -> Self {
        Self {
            feature,
            is_enabled: true,
            value: None,
            model: None,
        }
    }

    /// An enabled association limited to `limit` records of `model`.
    pub fn metered(feature: Feature, model: impl Into<String>, limit: i64) -> Self {
        Self {
            feature,
            is_enabled: true,
            value: Some(limit),
            model: Some(model.into()),
        }
    }

    pub fn key(&self) -> &str {
        &self.feature.key
    }

    /// True when `current_usage` has used up the limit.
    ///
    /// Unmetered features never reach a limit.
    pub fn limit_reached(&self, current_usage: i64) -> bool {
        self.value.map(|max| current_usage >= max).unwrap_or(false)
    }
}
