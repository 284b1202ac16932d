use async_trait::async_trait;
use sqlx::PgPool;

use super::{AccessStore, DependencySource, StoreResult};
use crate::database::models::{
    ApiClient, ApiClientPayload, EmpRole, EmpRoleKey, Permission, Role, RoleGrant, RolePermission,
    RolePermissionDetail, RolePermissionKey,
};
use crate::database::{DatabaseError, DatabaseManager};

const API_CLIENT_COLUMNS: &str = "id, application_name, api_secret, created_at, updated_at";
const ROLE_COLUMNS: &str = "role_id, role_name, role_description, created_at, updated_at";
const PERMISSION_COLUMNS: &str =
    "permission_id, permission_name, permission_description, system_id, created_at, updated_at";
const EMP_ROLE_COLUMNS: &str = "emp_id, role_id, system_id, created_at, updated_at";
const ROLE_PERMISSION_COLUMNS: &str = "role_id, permission_id, system_id, created_at, updated_at";

/// Postgres-backed store over the tables in `migrations/`
#[derive(Clone)]
pub struct PgAccessStore {
    pool: PgPool,
}

impl PgAccessStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessStore for PgAccessStore {
    async fn ping(&self) -> StoreResult<()> {
        DatabaseManager::health_check(&self.pool).await
    }

    async fn list_api_clients(&self) -> StoreResult<Vec<ApiClient>> {
        let sql = format!("SELECT {} FROM api_clients ORDER BY id", API_CLIENT_COLUMNS);
        Ok(sqlx::query_as::<_, ApiClient>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_api_client(&self, id: i32) -> StoreResult<Option<ApiClient>> {
        let sql = format!("SELECT {} FROM api_clients WHERE id = $1", API_CLIENT_COLUMNS);
        Ok(sqlx::query_as::<_, ApiClient>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_api_client_by_name(&self, application_name: &str) -> StoreResult<Option<ApiClient>> {
        let sql = format!(
            "SELECT {} FROM api_clients WHERE application_name = $1",
            API_CLIENT_COLUMNS
        );
        Ok(sqlx::query_as::<_, ApiClient>(&sql)
            .bind(application_name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_api_client(&self, payload: ApiClientPayload) -> StoreResult<ApiClient> {
        // An explicit id is honoured, otherwise the sequence assigns one
        let sql = match payload.id {
            Some(_) => format!(
                "INSERT INTO api_clients (id, application_name, api_secret) VALUES ($1, $2, $3) RETURNING {}",
                API_CLIENT_COLUMNS
            ),
            None => format!(
                "INSERT INTO api_clients (application_name, api_secret) VALUES ($1, $2) RETURNING {}",
                API_CLIENT_COLUMNS
            ),
        };

        let mut query = sqlx::query_as::<_, ApiClient>(&sql);
        if let Some(id) = payload.id {
            query = query.bind(id);
        }
        query
            .bind(&payload.application_name)
            .bind(&payload.api_secret)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_insert(e, "api client"))
    }

    async fn update_api_client(&self, client: &ApiClient) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE api_clients SET application_name = $2, api_secret = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(client.id)
        .bind(&client.application_name)
        .bind(&client.api_secret)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "api client"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_api_client(&self, id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM api_clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let sql = format!("SELECT {} FROM roles ORDER BY role_id", ROLE_COLUMNS);
        Ok(sqlx::query_as::<_, Role>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_role(&self, role_id: i32) -> StoreResult<Option<Role>> {
        let sql = format!("SELECT {} FROM roles WHERE role_id = $1", ROLE_COLUMNS);
        Ok(sqlx::query_as::<_, Role>(&sql)
            .bind(role_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_role(&self, role: &Role) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO roles (role_id, role_name, role_description, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(role.role_id)
        .bind(&role.role_name)
        .bind(&role.role_description)
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "role"))?;
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE roles SET role_name = $2, role_description = $3, updated_at = $4 WHERE role_id = $1",
        )
        .bind(role.role_id)
        .bind(&role.role_name)
        .bind(&role.role_description)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_role(&self, role_id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE role_id = $1")
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        let sql = format!("SELECT {} FROM permissions ORDER BY permission_id", PERMISSION_COLUMNS);
        Ok(sqlx::query_as::<_, Permission>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_permission(&self, permission_id: i32) -> StoreResult<Option<Permission>> {
        let sql = format!(
            "SELECT {} FROM permissions WHERE permission_id = $1",
            PERMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Permission>(&sql)
            .bind(permission_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn permissions_by_system(&self, system_id: i32) -> StoreResult<Vec<Permission>> {
        let sql = format!(
            "SELECT {} FROM permissions WHERE system_id = $1 ORDER BY permission_id",
            PERMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, Permission>(&sql)
            .bind(system_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn insert_permission(&self, permission: &Permission) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO permissions
                (permission_id, permission_name, permission_description, system_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(permission.permission_id)
        .bind(&permission.permission_name)
        .bind(&permission.permission_description)
        .bind(permission.system_id)
        .bind(permission.created_at)
        .bind(permission.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "permission"))?;
        Ok(())
    }

    async fn update_permission(&self, permission: &Permission) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE permissions
             SET permission_name = $2, permission_description = $3, system_id = $4, updated_at = $5
             WHERE permission_id = $1",
        )
        .bind(permission.permission_id)
        .bind(&permission.permission_name)
        .bind(&permission.permission_description)
        .bind(permission.system_id)
        .bind(permission.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_permission(&self, permission_id: i32) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM permissions WHERE permission_id = $1")
            .bind(permission_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_emp_roles(&self) -> StoreResult<Vec<EmpRole>> {
        let sql = format!(
            "SELECT {} FROM emp_roles ORDER BY emp_id, role_id, system_id",
            EMP_ROLE_COLUMNS
        );
        Ok(sqlx::query_as::<_, EmpRole>(&sql).fetch_all(&self.pool).await?)
    }

    async fn emp_roles_by_employee(&self, emp_id: &str) -> StoreResult<Vec<EmpRole>> {
        let sql = format!(
            "SELECT {} FROM emp_roles WHERE emp_id = $1 ORDER BY role_id, system_id",
            EMP_ROLE_COLUMNS
        );
        Ok(sqlx::query_as::<_, EmpRole>(&sql)
            .bind(emp_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn emp_role_exists(&self, key: &EmpRoleKey) -> StoreResult<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM emp_roles WHERE emp_id = $1 AND role_id = $2 AND system_id = $3)",
        )
        .bind(&key.emp_id)
        .bind(key.role_id)
        .bind(key.system_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists.0)
    }

    async fn insert_emp_role(&self, link: &EmpRole) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO emp_roles (emp_id, role_id, system_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&link.emp_id)
        .bind(link.role_id)
        .bind(link.system_id)
        .bind(link.created_at)
        .bind(link.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "employee-role association"))?;
        Ok(())
    }

    async fn delete_emp_role(&self, key: &EmpRoleKey) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM emp_roles WHERE emp_id = $1 AND role_id = $2 AND system_id = $3",
        )
        .bind(&key.emp_id)
        .bind(key.role_id)
        .bind(key.system_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_role_permissions(&self) -> StoreResult<Vec<RolePermission>> {
        let sql = format!(
            "SELECT {} FROM role_permissions ORDER BY role_id, permission_id, system_id",
            ROLE_PERMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, RolePermission>(&sql).fetch_all(&self.pool).await?)
    }

    async fn role_permissions_by_role(&self, role_id: i32) -> StoreResult<Vec<RolePermission>> {
        let sql = format!(
            "SELECT {} FROM role_permissions WHERE role_id = $1 ORDER BY permission_id, system_id",
            ROLE_PERMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, RolePermission>(&sql)
            .bind(role_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn role_permissions_by_permission(&self, permission_id: i32) -> StoreResult<Vec<RolePermission>> {
        let sql = format!(
            "SELECT {} FROM role_permissions WHERE permission_id = $1 ORDER BY role_id, system_id",
            ROLE_PERMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, RolePermission>(&sql)
            .bind(permission_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn role_permission_exists(&self, key: &RolePermissionKey) -> StoreResult<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM role_permissions WHERE role_id = $1 AND permission_id = $2 AND system_id = $3)",
        )
        .bind(key.role_id)
        .bind(key.permission_id)
        .bind(key.system_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists.0)
    }

    async fn insert_role_permission(&self, link: &RolePermission) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO role_permissions (role_id, permission_id, system_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(link.role_id)
        .bind(link.permission_id)
        .bind(link.system_id)
        .bind(link.created_at)
        .bind(link.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_insert(e, "role-permission association"))?;
        Ok(())
    }

    async fn delete_role_permission(&self, key: &RolePermissionKey) -> StoreResult<bool> {
        let result = sqlx::query(
            "DELETE FROM role_permissions WHERE role_id = $1 AND permission_id = $2 AND system_id = $3",
        )
        .bind(key.role_id)
        .bind(key.permission_id)
        .bind(key.system_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DependencySource for PgAccessStore {
    async fn emp_roles_by_role(&self, role_id: i32) -> StoreResult<Vec<EmpRole>> {
        let sql = format!(
            "SELECT {} FROM emp_roles WHERE role_id = $1 ORDER BY emp_id, system_id",
            EMP_ROLE_COLUMNS
        );
        Ok(sqlx::query_as::<_, EmpRole>(&sql)
            .bind(role_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn role_permission_details_by_role(&self, role_id: i32) -> StoreResult<Vec<RolePermissionDetail>> {
        Ok(sqlx::query_as::<_, RolePermissionDetail>(
            "SELECT rp.role_id, rp.permission_id, rp.system_id, rp.created_at, rp.updated_at,
                    p.permission_name
             FROM role_permissions rp
             LEFT JOIN permissions p ON p.permission_id = rp.permission_id
             WHERE rp.role_id = $1
             ORDER BY rp.permission_id, rp.system_id",
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn role_grants_by_permission(&self, permission_id: i32) -> StoreResult<Vec<RoleGrant>> {
        Ok(sqlx::query_as::<_, RoleGrant>(
            "SELECT rp.role_id, rp.permission_id, rp.system_id, rp.created_at, rp.updated_at,
                    r.role_name, r.role_description
             FROM role_permissions rp
             LEFT JOIN roles r ON r.role_id = rp.role_id
             WHERE rp.permission_id = $1
             ORDER BY rp.role_id, rp.system_id",
        )
        .bind(permission_id)
        .fetch_all(&self.pool)
        .await?)
    }
}
