//! Ownership configuration

use serde::Deserialize;

use crate::domain::subscription::OwnerKind;

/// Kind of owner every subscription of this deployment belongs to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OwnershipConfig {
    pub owner_kind: OwnerKind,
}
