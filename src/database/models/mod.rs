pub mod api_client;
pub mod emp_role;
pub mod permission;
pub mod role;
pub mod role_permission;

pub use api_client::{ApiClient, ApiClientPayload};
pub use emp_role::{EmpRole, EmpRoleKey};
pub use permission::{Permission, PermissionPayload};
pub use role::{Role, RolePayload, RoleSummary};
pub use role_permission::{RoleGrant, RolePermission, RolePermissionDetail, RolePermissionKey};
