use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::RoleSummary;

/// Grant of a permission to a role within one system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RolePermission {
    pub role_id: i32,
    pub permission_id: i32,
    pub system_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RolePermission {
    pub fn key(&self) -> RolePermissionKey {
        RolePermissionKey {
            role_id: self.role_id,
            permission_id: self.permission_id,
            system_id: self.system_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionKey {
    pub role_id: i32,
    pub permission_id: i32,
    pub system_id: i32,
}

impl RolePermissionKey {
    pub fn into_link(self, now: DateTime<Utc>) -> RolePermission {
        RolePermission {
            role_id: self.role_id,
            permission_id: self.permission_id,
            system_id: self.system_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A role-permission row with the permission's name when it still exists
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissionDetail {
    pub role_id: i32,
    pub permission_id: i32,
    pub system_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_name: Option<String>,
}

/// A role-permission row with the holding role's display fields when the
/// role still exists
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct RoleGrant {
    pub role_id: i32,
    pub permission_id: i32,
    pub system_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub role_name: Option<String>,
    pub role_description: Option<String>,
}

impl RoleGrant {
    pub fn link(&self) -> RolePermission {
        RolePermission {
            role_id: self.role_id,
            permission_id: self.permission_id,
            system_id: self.system_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn role(&self) -> RoleSummary {
        RoleSummary {
            role_id: self.role_id,
            role_name: self.role_name.clone(),
            role_description: self.role_description.clone(),
        }
    }
}
