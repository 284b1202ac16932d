use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{AccessStore, DependencySource, StoreResult};
use crate::database::models::{
    ApiClient, ApiClientPayload, EmpRole, EmpRoleKey, Permission, Role, RoleGrant, RolePermission,
    RolePermissionDetail, RolePermissionKey,
};
use crate::database::DatabaseError;

#[derive(Default)]
struct Tables {
    api_clients: BTreeMap<i32, ApiClient>,
    roles: BTreeMap<i32, Role>,
    permissions: BTreeMap<i32, Permission>,
    emp_roles: BTreeMap<EmpRoleKey, EmpRole>,
    role_permissions: BTreeMap<RolePermissionKey, RolePermission>,
}

/// In-process store. Ordered maps keep listings sorted by key, matching the
/// ORDER BY clauses of the Postgres store.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccessStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_api_clients(&self) -> StoreResult<Vec<ApiClient>> {
        Ok(self.tables.read().await.api_clients.values().cloned().collect())
    }

    async fn find_api_client(&self, id: i32) -> StoreResult<Option<ApiClient>> {
        Ok(self.tables.read().await.api_clients.get(&id).cloned())
    }

    async fn find_api_client_by_name(&self, application_name: &str) -> StoreResult<Option<ApiClient>> {
        Ok(self
            .tables
            .read()
            .await
            .api_clients
            .values()
            .find(|c| c.application_name == application_name)
            .cloned())
    }

    async fn insert_api_client(&self, payload: ApiClientPayload) -> StoreResult<ApiClient> {
        let mut tables = self.tables.write().await;

        let name_taken = tables
            .api_clients
            .values()
            .any(|c| c.application_name == payload.application_name);
        if name_taken {
            return Err(DatabaseError::Duplicate("api client".to_string()));
        }

        let id = match payload.id {
            Some(id) if tables.api_clients.contains_key(&id) => {
                return Err(DatabaseError::Duplicate("api client".to_string()));
            }
            Some(id) => id,
            None => match tables.api_clients.keys().next_back() {
                Some(last) => last
                    .checked_add(1)
                    .ok_or(DatabaseError::IdsExhausted("api client"))?,
                None => 1,
            },
        };

        let now = Utc::now();
        let client = ApiClient {
            id,
            application_name: payload.application_name,
            api_secret: payload.api_secret,
            created_at: now,
            updated_at: now,
        };
        tables.api_clients.insert(id, client.clone());
        Ok(client)
    }

    async fn update_api_client(&self, client: &ApiClient) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.api_clients.get_mut(&client.id) {
            Some(existing) => {
                existing.application_name = client.application_name.clone();
                existing.api_secret = client.api_secret.clone();
                existing.updated_at = client.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_api_client(&self, id: i32) -> StoreResult<bool> {
        Ok(self.tables.write().await.api_clients.remove(&id).is_some())
    }

    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        Ok(self.tables.read().await.roles.values().cloned().collect())
    }

    async fn find_role(&self, role_id: i32) -> StoreResult<Option<Role>> {
        Ok(self.tables.read().await.roles.get(&role_id).cloned())
    }

    async fn insert_role(&self, role: &Role) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.roles.contains_key(&role.role_id) {
            return Err(DatabaseError::Duplicate("role".to_string()));
        }
        tables.roles.insert(role.role_id, role.clone());
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.roles.get_mut(&role.role_id) {
            Some(existing) => {
                existing.role_name = role.role_name.clone();
                existing.role_description = role.role_description.clone();
                existing.updated_at = role.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_role(&self, role_id: i32) -> StoreResult<bool> {
        Ok(self.tables.write().await.roles.remove(&role_id).is_some())
    }

    async fn list_permissions(&self) -> StoreResult<Vec<Permission>> {
        Ok(self.tables.read().await.permissions.values().cloned().collect())
    }

    async fn find_permission(&self, permission_id: i32) -> StoreResult<Option<Permission>> {
        Ok(self.tables.read().await.permissions.get(&permission_id).cloned())
    }

    async fn permissions_by_system(&self, system_id: i32) -> StoreResult<Vec<Permission>> {
        Ok(self
            .tables
            .read()
            .await
            .permissions
            .values()
            .filter(|p| p.system_id == system_id)
            .cloned()
            .collect())
    }

    async fn insert_permission(&self, permission: &Permission) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.permissions.contains_key(&permission.permission_id) {
            return Err(DatabaseError::Duplicate("permission".to_string()));
        }
        tables.permissions.insert(permission.permission_id, permission.clone());
        Ok(())
    }

    async fn update_permission(&self, permission: &Permission) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.permissions.get_mut(&permission.permission_id) {
            Some(existing) => {
                existing.permission_name = permission.permission_name.clone();
                existing.permission_description = permission.permission_description.clone();
                existing.system_id = permission.system_id;
                existing.updated_at = permission.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_permission(&self, permission_id: i32) -> StoreResult<bool> {
        Ok(self.tables.write().await.permissions.remove(&permission_id).is_some())
    }

    async fn list_emp_roles(&self) -> StoreResult<Vec<EmpRole>> {
        Ok(self.tables.read().await.emp_roles.values().cloned().collect())
    }

    async fn emp_roles_by_employee(&self, emp_id: &str) -> StoreResult<Vec<EmpRole>> {
        Ok(self
            .tables
            .read()
            .await
            .emp_roles
            .values()
            .filter(|l| l.emp_id == emp_id)
            .cloned()
            .collect())
    }

    async fn emp_role_exists(&self, key: &EmpRoleKey) -> StoreResult<bool> {
        Ok(self.tables.read().await.emp_roles.contains_key(key))
    }

    async fn insert_emp_role(&self, link: &EmpRole) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let key = link.key();
        if tables.emp_roles.contains_key(&key) {
            return Err(DatabaseError::Duplicate("employee-role association".to_string()));
        }
        tables.emp_roles.insert(key, link.clone());
        Ok(())
    }

    async fn delete_emp_role(&self, key: &EmpRoleKey) -> StoreResult<bool> {
        Ok(self.tables.write().await.emp_roles.remove(key).is_some())
    }

    async fn list_role_permissions(&self) -> StoreResult<Vec<RolePermission>> {
        Ok(self.tables.read().await.role_permissions.values().cloned().collect())
    }

    async fn role_permissions_by_role(&self, role_id: i32) -> StoreResult<Vec<RolePermission>> {
        Ok(self
            .tables
            .read()
            .await
            .role_permissions
            .values()
            .filter(|l| l.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn role_permissions_by_permission(&self, permission_id: i32) -> StoreResult<Vec<RolePermission>> {
        Ok(self
            .tables
            .read()
            .await
            .role_permissions
            .values()
            .filter(|l| l.permission_id == permission_id)
            .cloned()
            .collect())
    }

    async fn role_permission_exists(&self, key: &RolePermissionKey) -> StoreResult<bool> {
        Ok(self.tables.read().await.role_permissions.contains_key(key))
    }

    async fn insert_role_permission(&self, link: &RolePermission) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let key = link.key();
        if tables.role_permissions.contains_key(&key) {
            return Err(DatabaseError::Duplicate("role-permission association".to_string()));
        }
        tables.role_permissions.insert(key, link.clone());
        Ok(())
    }

    async fn delete_role_permission(&self, key: &RolePermissionKey) -> StoreResult<bool> {
        Ok(self.tables.write().await.role_permissions.remove(key).is_some())
    }
}

#[async_trait]
impl DependencySource for MemoryStore {
    async fn emp_roles_by_role(&self, role_id: i32) -> StoreResult<Vec<EmpRole>> {
        Ok(self
            .tables
            .read()
            .await
            .emp_roles
            .values()
            .filter(|l| l.role_id == role_id)
            .cloned()
            .collect())
    }

    async fn role_permission_details_by_role(&self, role_id: i32) -> StoreResult<Vec<RolePermissionDetail>> {
        let tables = self.tables.read().await;
        Ok(tables
            .role_permissions
            .values()
            .filter(|l| l.role_id == role_id)
            .map(|l| RolePermissionDetail {
                role_id: l.role_id,
                permission_id: l.permission_id,
                system_id: l.system_id,
                created_at: l.created_at,
                updated_at: l.updated_at,
                permission_name: tables
                    .permissions
                    .get(&l.permission_id)
                    .map(|p| p.permission_name.clone()),
            })
            .collect())
    }

    async fn role_grants_by_permission(&self, permission_id: i32) -> StoreResult<Vec<RoleGrant>> {
        let tables = self.tables.read().await;
        Ok(tables
            .role_permissions
            .values()
            .filter(|l| l.permission_id == permission_id)
            .map(|l| {
                let role = tables.roles.get(&l.role_id);
                RoleGrant {
                    role_id: l.role_id,
                    permission_id: l.permission_id,
                    system_id: l.system_id,
                    created_at: l.created_at,
                    updated_at: l.updated_at,
                    role_name: role.map(|r| r.role_name.clone()),
                    role_description: role.and_then(|r| r.role_description.clone()),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(id: i32, name: &str) -> Role {
        let now = Utc::now();
        Role {
            role_id: id,
            role_name: name.to_string(),
            role_description: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn grant(role_id: i32, permission_id: i32, system_id: i32) -> RolePermission {
        RolePermissionKey { role_id, permission_id, system_id }.into_link(Utc::now())
    }

    #[tokio::test]
    async fn rejects_duplicate_link_triples() {
        let store = MemoryStore::new();
        let link = grant(1, 2, 3);
        store.insert_role_permission(&link).await.unwrap();

        let again = store.insert_role_permission(&link).await;
        assert!(matches!(again, Err(DatabaseError::Duplicate(_))));

        // Same pair in another system is a different assignment
        store.insert_role_permission(&grant(1, 2, 4)).await.unwrap();
        assert_eq!(store.role_permissions_by_role(1).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn grants_keep_links_to_missing_roles() {
        let store = MemoryStore::new();
        store.insert_role(&role(1, "admin")).await.unwrap();
        store.insert_role_permission(&grant(1, 9, 1)).await.unwrap();
        store.insert_role_permission(&grant(1, 9, 2)).await.unwrap();
        store.insert_role_permission(&grant(7, 9, 1)).await.unwrap();

        let grants = store.role_grants_by_permission(9).await.unwrap();
        let seen: Vec<(i32, i32, Option<&str>)> = grants
            .iter()
            .map(|g| (g.role_id, g.system_id, g.role_name.as_deref()))
            .collect();
        assert_eq!(
            seen,
            vec![(1, 1, Some("admin")), (1, 2, Some("admin")), (7, 1, None)]
        );
        assert_eq!(store.role_permissions_by_permission(9).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn assigns_sequential_api_client_ids() {
        let store = MemoryStore::new();
        let first = store
            .insert_api_client(ApiClientPayload {
                id: None,
                application_name: "portal".to_string(),
                api_secret: "s1".to_string(),
            })
            .await
            .unwrap();
        let second = store
            .insert_api_client(ApiClientPayload {
                id: None,
                application_name: "kiosk".to_string(),
                api_secret: "s2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let clash = store
            .insert_api_client(ApiClientPayload {
                id: None,
                application_name: "portal".to_string(),
                api_secret: "s3".to_string(),
            })
            .await;
        assert!(matches!(clash, Err(DatabaseError::Duplicate(_))));
    }

    #[tokio::test]
    async fn refuses_to_assign_past_the_largest_id() {
        let store = MemoryStore::new();
        store
            .insert_api_client(ApiClientPayload {
                id: Some(i32::MAX),
                application_name: "last".to_string(),
                api_secret: "s1".to_string(),
            })
            .await
            .unwrap();

        let next = store
            .insert_api_client(ApiClientPayload {
                id: None,
                application_name: "overflow".to_string(),
                api_secret: "s2".to_string(),
            })
            .await;
        assert!(matches!(next, Err(DatabaseError::IdsExhausted("api client"))));

        let explicit = store
            .insert_api_client(ApiClientPayload {
                id: Some(5),
                application_name: "overflow".to_string(),
                api_secret: "s2".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(explicit.id, 5);
    }
}
