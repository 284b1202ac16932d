use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Assignment of a role to an employee within one system
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EmpRole {
    pub emp_id: String,
    pub role_id: i32,
    pub system_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmpRole {
    pub fn key(&self) -> EmpRoleKey {
        EmpRoleKey {
            emp_id: self.emp_id.clone(),
            role_id: self.role_id,
            system_id: self.system_id,
        }
    }
}

/// The (employee, role, system) triple that identifies an assignment.
/// Doubles as the create/delete request body; extra fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmpRoleKey {
    pub emp_id: String,
    pub role_id: i32,
    pub system_id: i32,
}

impl EmpRoleKey {
    pub fn into_link(self, now: DateTime<Utc>) -> EmpRole {
        EmpRole {
            emp_id: self.emp_id,
            role_id: self.role_id,
            system_id: self.system_id,
            created_at: now,
            updated_at: now,
        }
    }
}
