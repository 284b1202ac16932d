//! Access to the five access-control tables.
//!
//! `AccessStore` is the full read/write surface used by the CRUD handlers.
//! `DependencySource` is the narrow read-only slice the deletion checks need;
//! keeping it separate lets the validator run against anything that can
//! answer "who references this id".

use async_trait::async_trait;

use crate::database::models::{
    ApiClient, ApiClientPayload, EmpRole, EmpRoleKey, Permission, Role, RoleGrant, RolePermission,
    RolePermissionDetail, RolePermissionKey,
};
use crate::database::DatabaseError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgAccessStore;

pub type StoreResult<T> = Result<T, DatabaseError>;

#[async_trait]
pub trait AccessStore: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    // API client credentials
    async fn list_api_clients(&self) -> StoreResult<Vec<ApiClient>>;
    async fn find_api_client(&self, id: i32) -> StoreResult<Option<ApiClient>>;
    async fn find_api_client_by_name(&self, application_name: &str) -> StoreResult<Option<ApiClient>>;
    async fn insert_api_client(&self, payload: ApiClientPayload) -> StoreResult<ApiClient>;
    /// Returns false when no row has the client's id
    async fn update_api_client(&self, client: &ApiClient) -> StoreResult<bool>;
    async fn delete_api_client(&self, id: i32) -> StoreResult<bool>;

    // Roles
    async fn list_roles(&self) -> StoreResult<Vec<Role>>;
    async fn find_role(&self, role_id: i32) -> StoreResult<Option<Role>>;
    async fn insert_role(&self, role: &Role) -> StoreResult<()>;
    async fn update_role(&self, role: &Role) -> StoreResult<bool>;
    async fn delete_role(&self, role_id: i32) -> StoreResult<bool>;

    // Permissions
    async fn list_permissions(&self) -> StoreResult<Vec<Permission>>;
    async fn find_permission(&self, permission_id: i32) -> StoreResult<Option<Permission>>;
    async fn permissions_by_system(&self, system_id: i32) -> StoreResult<Vec<Permission>>;
    async fn insert_permission(&self, permission: &Permission) -> StoreResult<()>;
    async fn update_permission(&self, permission: &Permission) -> StoreResult<bool>;
    async fn delete_permission(&self, permission_id: i32) -> StoreResult<bool>;

    // Employee-role links
    async fn list_emp_roles(&self) -> StoreResult<Vec<EmpRole>>;
    async fn emp_roles_by_employee(&self, emp_id: &str) -> StoreResult<Vec<EmpRole>>;
    async fn emp_role_exists(&self, key: &EmpRoleKey) -> StoreResult<bool>;
    async fn insert_emp_role(&self, link: &EmpRole) -> StoreResult<()>;
    async fn delete_emp_role(&self, key: &EmpRoleKey) -> StoreResult<bool>;

    // Role-permission links
    async fn list_role_permissions(&self) -> StoreResult<Vec<RolePermission>>;
    async fn role_permissions_by_role(&self, role_id: i32) -> StoreResult<Vec<RolePermission>>;
    async fn role_permissions_by_permission(&self, permission_id: i32) -> StoreResult<Vec<RolePermission>>;
    async fn role_permission_exists(&self, key: &RolePermissionKey) -> StoreResult<bool>;
    async fn insert_role_permission(&self, link: &RolePermission) -> StoreResult<()>;
    async fn delete_role_permission(&self, key: &RolePermissionKey) -> StoreResult<bool>;
}

/// Read-only queries for rows that reference a role or permission
#[async_trait]
pub trait DependencySource: Send + Sync {
    /// Employee-role links whose role is `role_id`
    async fn emp_roles_by_role(&self, role_id: i32) -> StoreResult<Vec<EmpRole>>;

    /// Role-permission links whose role is `role_id`, with permission names
    async fn role_permission_details_by_role(&self, role_id: i32) -> StoreResult<Vec<RolePermissionDetail>>;

    /// Role-permission links whose permission is `permission_id`, each with
    /// its role's display fields, read in one pass and ordered by role id
    async fn role_grants_by_permission(&self, permission_id: i32) -> StoreResult<Vec<RoleGrant>>;
}
