use serde::Serialize;
use tracing::{debug, error, warn};

use crate::database::models::{EmpRole, RolePermissionDetail, RoleSummary};
use crate::services::dependency_lookup::{DependencyLookup, LookupError};

pub const VALIDATION_ERROR_REASON: &str = "An error occurred while validating the deletion request.";

/// The rows that keep an entity from being deleted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentData {
    /// Employees holding the role (role deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_roles: Option<Vec<EmpRole>>,
    /// Permissions granted to the role (role deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_permissions: Option<Vec<RolePermissionDetail>>,
    /// Roles holding the permission (permission deletes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<RoleSummary>>,
}

/// Outcome of a deletion check. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DeletionVerdict {
    pub can_delete: bool,
    pub reason: String,
    /// One machine-readable line per blocking category
    pub dependencies: Vec<String>,
    pub dependent_data: Option<DependentData>,
}

impl DeletionVerdict {
    pub fn allowed() -> Self {
        Self {
            can_delete: true,
            reason: String::new(),
            dependencies: Vec::new(),
            dependent_data: None,
        }
    }

    /// Fail closed: a check that could not run denies the delete
    fn lookup_failed(err: &LookupError) -> Self {
        Self {
            can_delete: false,
            reason: VALIDATION_ERROR_REASON.to_string(),
            dependencies: vec![format!("Validation error: {}", err)],
            dependent_data: None,
        }
    }
}

/// Decides whether a role or permission may be deleted. Only reads; every
/// call returns a verdict, storage faults included.
pub struct DeletionValidator {
    lookup: DependencyLookup,
}

impl DeletionValidator {
    pub fn new(lookup: DependencyLookup) -> Self {
        Self { lookup }
    }

    pub async fn can_delete_permission(&self, permission_id: i32) -> DeletionVerdict {
        let deps = match self.lookup.for_permission(permission_id).await {
            Ok(deps) => deps,
            Err(e) => {
                error!(permission_id, error = %e, "Error validating deletion for permission");
                return DeletionVerdict::lookup_failed(&e);
            }
        };

        if deps.is_empty() {
            debug!(permission_id, "Permission can be safely deleted - no dependencies found");
            return DeletionVerdict::allowed();
        }

        let assignment_count = deps.assignments.len();
        let role_count = deps.roles.len();
        let role_names: Vec<String> = deps
            .roles
            .iter()
            .map(|r| match &r.role_name {
                Some(name) => name.clone(),
                None => format!("unknown role (ID: {})", r.role_id),
            })
            .collect();
        let reason = format!(
            "Cannot delete Permission (ID: {}). It is currently assigned to {} role(s): {}. \
             Please remove these role-permission assignments first.",
            permission_id,
            role_count,
            role_names.join(", ")
        );

        warn!(
            permission_id,
            assignments = assignment_count,
            roles = role_count,
            "Deletion validation failed for permission"
        );

        DeletionVerdict {
            can_delete: false,
            reason,
            dependencies: vec![format!("{} Role-Permission assignment(s)", assignment_count)],
            dependent_data: Some(DependentData {
                roles: Some(deps.roles),
                ..DependentData::default()
            }),
        }
    }

    pub async fn can_delete_role(&self, role_id: i32) -> DeletionVerdict {
        let deps = match self.lookup.for_role(role_id).await {
            Ok(deps) => deps,
            Err(e) => {
                error!(role_id, error = %e, "Error validating deletion for role");
                return DeletionVerdict::lookup_failed(&e);
            }
        };

        if deps.is_empty() {
            debug!(role_id, "Role can be safely deleted - no dependencies found");
            return DeletionVerdict::allowed();
        }

        let mut dependencies = Vec::new();
        let mut reason_parts = Vec::new();
        let mut dependent_data = DependentData::default();

        if !deps.employee_roles.is_empty() {
            let count = deps.employee_roles.len();
            dependencies.push(format!("{} Employee-Role assignment(s)", count));
            reason_parts.push(format!("{} employee(s) are assigned this role", count));
            dependent_data.employee_roles = Some(deps.employee_roles);
        }

        if !deps.role_permissions.is_empty() {
            let count = deps.role_permissions.len();
            dependencies.push(format!("{} Role-Permission assignment(s)", count));
            reason_parts.push(format!("{} permission(s) are assigned to this role", count));
            dependent_data.role_permissions = Some(deps.role_permissions);
        }

        let reason = format!(
            "Cannot delete Role (ID: {}). {}. Please remove these assignments first.",
            role_id,
            reason_parts.join(" and ")
        );

        warn!(role_id, reason = %reason, "Deletion validation failed for role");

        DeletionVerdict {
            can_delete: false,
            reason,
            dependencies,
            dependent_data: Some(dependent_data),
        }
    }
}
