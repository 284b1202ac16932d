use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub permission_id: i32,
    pub permission_name: String,
    pub permission_description: Option<String>,
    pub system_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionPayload {
    pub permission_id: i32,
    pub permission_name: String,
    #[serde(default)]
    pub permission_description: Option<String>,
    pub system_id: i32,
}

impl PermissionPayload {
    pub fn into_permission(self, now: DateTime<Utc>) -> Permission {
        Permission {
            permission_id: self.permission_id,
            permission_name: self.permission_name,
            permission_description: self.permission_description,
            system_id: self.system_id,
            created_at: now,
            updated_at: now,
        }
    }
}
