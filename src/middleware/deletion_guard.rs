use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::warn;

use crate::app::AppState;
use crate::services::{DeletionVerdict, DependentData};

/// Entities whose deletes are checked for dangling references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Role,
    Permission,
}

impl EntityKind {
    /// Path segment that precedes the id
    pub fn segment(self) -> &'static str {
        match self {
            EntityKind::Role => "role",
            EntityKind::Permission => "permission",
        }
    }
}

/// How a request relates to the deletion checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteInterception {
    NotApplicable,
    /// Delete of a guarded entity without a numeric id after its segment
    Unparseable(EntityKind),
    Target { kind: EntityKind, id: i32 },
}

/// Decide whether a request is a guarded delete. Matching is on the
/// lowercased path; `/rolepermission` is a link-table path, not a role.
pub fn classify(method: &Method, path: &str) -> DeleteInterception {
    if method != Method::DELETE {
        return DeleteInterception::NotApplicable;
    }

    let lower = path.to_ascii_lowercase();
    let kind = if lower.contains("/permission/") {
        EntityKind::Permission
    } else if lower.contains("/role/") && !lower.contains("/rolepermission") {
        EntityKind::Role
    } else {
        return DeleteInterception::NotApplicable;
    };

    match extract_id_from_path(path, kind.segment()) {
        Some(id) => DeleteInterception::Target { kind, id },
        None => DeleteInterception::Unparseable(kind),
    }
}

/// First integer segment that directly follows a segment equal to `entity`
/// (ASCII case-insensitive)
pub fn extract_id_from_path(path: &str, entity: &str) -> Option<i32> {
    let segments: Vec<&str> = path.split('/').collect();
    segments
        .windows(2)
        .filter(|pair| pair[0].eq_ignore_ascii_case(entity))
        .find_map(|pair| pair[1].parse::<i32>().ok())
}

/// Body of a 409 for a blocked delete
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionConflict {
    pub error: &'static str,
    pub message: String,
    pub dependencies: Vec<String>,
    pub dependent_data: Option<DependentData>,
    pub status_code: u16,
}

impl From<DeletionVerdict> for DeletionConflict {
    fn from(verdict: DeletionVerdict) -> Self {
        Self {
            error: "Deletion not allowed",
            message: verdict.reason,
            dependencies: verdict.dependencies,
            dependent_data: verdict.dependent_data,
            status_code: StatusCode::CONFLICT.as_u16(),
        }
    }
}

impl IntoResponse for DeletionConflict {
    fn into_response(self) -> Response {
        (StatusCode::CONFLICT, Json(self)).into_response()
    }
}

/// Block deletes of roles and permissions that are still referenced by
/// link rows. Anything else passes through untouched.
pub async fn deletion_guard_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (kind, id) = match classify(request.method(), request.uri().path()) {
        DeleteInterception::NotApplicable => return next.run(request).await,
        DeleteInterception::Unparseable(kind) => {
            warn!(
                path = %request.uri().path(),
                entity = kind.segment(),
                "DELETE without a numeric id, skipping deletion validation"
            );
            return next.run(request).await;
        }
        DeleteInterception::Target { kind, id } => (kind, id),
    };

    let validator = state.deletion_validator();
    let verdict = match kind {
        EntityKind::Permission => validator.can_delete_permission(id).await,
        EntityKind::Role => validator.can_delete_role(id).await,
    };

    if verdict.can_delete {
        return next.run(request).await;
    }

    match kind {
        EntityKind::Permission => {
            warn!(permission_id = id, reason = %verdict.reason, "DELETE request blocked for permission")
        }
        EntityKind::Role => warn!(role_id = id, reason = %verdict.reason, "DELETE request blocked for role"),
    }

    DeletionConflict::from(verdict).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;
    use crate::database::models::{EmpRole, EmpRoleKey, RoleGrant, RolePermissionDetail};
    use crate::database::DatabaseError;
    use crate::store::{AccessStore, DependencySource, MemoryStore, StoreResult};
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        middleware::from_fn_with_state,
        routing::delete,
        Router,
    };
    use chrono::Utc;
    use serde_json::Value;
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    const MARKER: &str = "x-reached-handler";

    async fn reached() -> Response {
        (StatusCode::NO_CONTENT, [(MARKER, "1")]).into_response()
    }

    fn guarded(state: AppState) -> Router {
        Router::new()
            .route("/role/:id", delete(reached))
            .route("/permission/:id", delete(reached))
            .route("/rolepermission", delete(reached))
            .route("/emprole/role/:id", delete(reached))
            .layer(from_fn_with_state(state.clone(), deletion_guard_middleware))
            .with_state(state)
    }

    fn state_for(store: Arc<MemoryStore>) -> AppState {
        AppState::new(store, SecurityConfig::default(), Duration::from_secs(1))
    }

    async fn send_delete(router: Router, uri: &str) -> Response {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router.oneshot(request).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    struct BrokenStore;

    #[async_trait]
    impl DependencySource for BrokenStore {
        async fn emp_roles_by_role(&self, _role_id: i32) -> StoreResult<Vec<EmpRole>> {
            Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
        }

        async fn role_permission_details_by_role(&self, _role_id: i32) -> StoreResult<Vec<RolePermissionDetail>> {
            Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
        }

        async fn role_grants_by_permission(&self, _permission_id: i32) -> StoreResult<Vec<RoleGrant>> {
            Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut))
        }
    }

    #[test]
    fn classifies_guarded_paths() {
        let delete = Method::DELETE;
        assert_eq!(
            classify(&delete, "/Role/5"),
            DeleteInterception::Target { kind: EntityKind::Role, id: 5 }
        );
        assert_eq!(
            classify(&delete, "/permission/7"),
            DeleteInterception::Target { kind: EntityKind::Permission, id: 7 }
        );
        assert_eq!(classify(&delete, "/rolepermission"), DeleteInterception::NotApplicable);
        assert_eq!(classify(&delete, "/rolepermission/role/5"), DeleteInterception::NotApplicable);
        assert_eq!(classify(&delete, "/emprole"), DeleteInterception::NotApplicable);
        assert_eq!(classify(&Method::GET, "/role/5"), DeleteInterception::NotApplicable);
        assert_eq!(
            classify(&delete, "/role/abc"),
            DeleteInterception::Unparseable(EntityKind::Role)
        );
    }

    #[test]
    fn extracts_first_numeric_id_after_entity() {
        assert_eq!(extract_id_from_path("/api/ROLE/42", "role"), Some(42));
        assert_eq!(extract_id_from_path("/role/x/role/9", "role"), Some(9));
        assert_eq!(extract_id_from_path("/role/", "role"), None);
        assert_eq!(extract_id_from_path("/role", "role"), None);
        assert_eq!(extract_id_from_path("/permission/99999999999", "permission"), None);
    }

    #[tokio::test]
    async fn referenced_role_is_rejected_before_the_handler() {
        let store = Arc::new(MemoryStore::new());
        let link = EmpRoleKey { emp_id: "E1".to_string(), role_id: 5, system_id: 1 }.into_link(Utc::now());
        store.insert_emp_role(&link).await.unwrap();

        let response = send_delete(guarded(state_for(store)), "/role/5").await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.headers().get(MARKER).is_none());

        let body = body_json(response).await;
        assert_eq!(body["error"], "Deletion not allowed");
        assert_eq!(body["statusCode"], 409);
        assert_eq!(body["dependencies"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["dependentData"]["employeeRoles"][0]["empId"], "E1");
    }

    #[tokio::test]
    async fn unreferenced_permission_reaches_the_handler() {
        let response = send_delete(guarded(state_for(Arc::new(MemoryStore::new()))), "/permission/7").await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers().get(MARKER).unwrap(), "1");
    }

    #[tokio::test]
    async fn link_table_deletes_are_not_role_deletes() {
        let store = Arc::new(MemoryStore::new());
        let link = EmpRoleKey { emp_id: "E1".to_string(), role_id: 5, system_id: 1 }.into_link(Utc::now());
        store.insert_emp_role(&link).await.unwrap();

        let response = send_delete(guarded(state_for(store)), "/rolepermission").await;
        assert_eq!(response.headers().get(MARKER).unwrap(), "1");
    }

    #[tokio::test]
    async fn unparseable_ids_are_forwarded() {
        let response = send_delete(guarded(state_for(Arc::new(MemoryStore::new()))), "/role/admin").await;
        assert_eq!(response.headers().get(MARKER).unwrap(), "1");
    }

    #[tokio::test]
    async fn storage_fault_blocks_the_delete() {
        let state = AppState {
            dependencies: Arc::new(BrokenStore),
            ..state_for(Arc::new(MemoryStore::new()))
        };

        let response = send_delete(guarded(state), "/role/1").await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        let first = body["dependencies"][0].as_str().unwrap();
        assert!(first.starts_with("Validation error: "));
        assert!(body["dependentData"].is_null());
    }
}
