//! Subscription owners.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::{OwnerId, ValidationError};

/// Kind of entity that holds subscriptions, fixed per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OwnerKind {
    #[default]
    User,
    Team,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnerKind::User => "user",
            OwnerKind::Team => "team",
        }
    }
}

impl FromStr for OwnerKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(OwnerKind::User),
            "team" => Ok(OwnerKind::Team),
            other => Err(ValidationError::invalid_format(
                "owner_kind",
                format!("'{}' is not one of: user, team", other),
            )),
        }
    }
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The user or team a subscription belongs to.
///
/// Operations receive the owner as the acting identity; there is no
/// separate actor concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Owner {
    pub kind: OwnerKind,
    pub id: OwnerId,
}

impl Owner {
    pub fn new(kind: OwnerKind, id: OwnerId) -> Self {
        Self { kind, id }
    }

    pub fn user(id: OwnerId) -> Self {
        Self::new(OwnerKind::User, id)
    }

    pub fn team(id: OwnerId) -> Self {
        Self::new(OwnerKind::Team, id)
    }
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
