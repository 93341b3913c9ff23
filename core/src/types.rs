//! Shared primitive types used across the workforce core.

use serde::{Deserialize, Serialize};

/// A stable, unique identifier for an employee or a skill.
pub type EntityId = String;

/// Lowest proficiency an assignment may carry.
pub const MIN_PROFICIENCY: u8 = 1;

/// Highest proficiency an assignment may carry.
pub const MAX_PROFICIENCY: u8 = 10;

/// Access role of an employee record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Employee => "employee",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(Self::Admin),
            "employee" => Some(Self::Employee),
            _ => None,
        }
    }
}

/// Fresh random entity id.
pub fn new_entity_id() -> EntityId {
    uuid::Uuid::new_v4().to_string()
}
