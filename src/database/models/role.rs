use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A role row. Identifiers are assigned by the caller, never generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub role_id: i32,
    pub role_name: String,
    pub role_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating or replacing a role
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePayload {
    pub role_id: i32,
    pub role_name: String,
    #[serde(default)]
    pub role_description: Option<String>,
}

impl RolePayload {
    pub fn into_role(self, now: DateTime<Utc>) -> Role {
        Role {
            role_id: self.role_id,
            role_name: self.role_name,
            role_description: self.role_description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Display fields of a role, as surfaced when it blocks a permission delete.
/// Name and description are absent when a link names a role that no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub role_id: i32,
    pub role_name: Option<String>,
    pub role_description: Option<String>,
}
