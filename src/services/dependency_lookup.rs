use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::database::models::{EmpRole, RoleGrant, RolePermission, RolePermissionDetail, RoleSummary};
use crate::database::DatabaseError;
use crate::store::{DependencySource, StoreResult};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error("dependency lookup timed out after {0:?}")]
    TimedOut(Duration),
}

/// Rows that reference a permission
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermissionDependencies {
    pub assignments: Vec<RolePermission>,
    /// One entry per distinct role id in `assignments`, ordered by role id
    pub roles: Vec<RoleSummary>,
}

impl PermissionDependencies {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    fn from_grants(grants: &[RoleGrant]) -> Self {
        let mut roles = BTreeMap::new();
        for grant in grants {
            roles.entry(grant.role_id).or_insert_with(|| grant.role());
        }
        Self {
            assignments: grants.iter().map(RoleGrant::link).collect(),
            roles: roles.into_values().collect(),
        }
    }
}

/// Rows that reference a role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleDependencies {
    pub employee_roles: Vec<EmpRole>,
    pub role_permissions: Vec<RolePermissionDetail>,
}

impl RoleDependencies {
    pub fn is_empty(&self) -> bool {
        self.employee_roles.is_empty() && self.role_permissions.is_empty()
    }
}

/// Finds link rows pointing at a role or permission. Read-only; every store
/// call is bounded by `timeout`.
#[derive(Clone)]
pub struct DependencyLookup {
    source: Arc<dyn DependencySource>,
    timeout: Duration,
}

impl DependencyLookup {
    pub fn new(source: Arc<dyn DependencySource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Links and roles come from a single store read, so the role list always
    /// matches the links it was derived from.
    pub async fn for_permission(&self, permission_id: i32) -> Result<PermissionDependencies, LookupError> {
        let grants = self
            .bounded(self.source.role_grants_by_permission(permission_id))
            .await?;
        Ok(PermissionDependencies::from_grants(&grants))
    }

    /// Both link tables are always queried so a verdict can name every
    /// blocking category at once.
    pub async fn for_role(&self, role_id: i32) -> Result<RoleDependencies, LookupError> {
        let (employee_roles, role_permissions) = tokio::join!(
            self.bounded(self.source.emp_roles_by_role(role_id)),
            self.bounded(self.source.role_permission_details_by_role(role_id)),
        );

        Ok(RoleDependencies {
            employee_roles: employee_roles?,
            role_permissions: role_permissions?,
        })
    }

    async fn bounded<T, F>(&self, query: F) -> Result<T, LookupError>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(LookupError::TimedOut(self.timeout)),
        }
    }
}
