use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::debug;

use crate::app::AppState;
use crate::database::models::{RolePermission, RolePermissionKey};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /rolepermission/all
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<RolePermission>> {
    debug!("Getting all role-permission associations");
    Ok(ApiResponse::success(state.store.list_role_permissions().await?))
}

/// GET /rolepermission/role/:role_id
pub async fn by_role(State(state): State<AppState>, Path(role_id): Path<i32>) -> ApiResult<Vec<RolePermission>> {
    debug!(role_id, "Getting permissions for role");
    Ok(ApiResponse::success(state.store.role_permissions_by_role(role_id).await?))
}

/// GET /rolepermission/permission/:permission_id
pub async fn by_permission(
    State(state): State<AppState>,
    Path(permission_id): Path<i32>,
) -> ApiResult<Vec<RolePermission>> {
    debug!(permission_id, "Getting roles for permission");
    Ok(ApiResponse::success(state.store.role_permissions_by_permission(permission_id).await?))
}

/// POST /rolepermission
pub async fn create(
    State(state): State<AppState>,
    Json(key): Json<RolePermissionKey>,
) -> ApiResult<RolePermission> {
    debug!(role_id = key.role_id, permission_id = key.permission_id, "Creating role-permission association");
    if state.store.role_permission_exists(&key).await? {
        return Err(ApiError::bad_request("This role-permission association already exists."));
    }

    let link = key.into_link(Utc::now());
    state.store.insert_role_permission(&link).await?;
    Ok(ApiResponse::created(link))
}

/// DELETE /rolepermission - the association is identified by the body
pub async fn delete(State(state): State<AppState>, Json(key): Json<RolePermissionKey>) -> ApiResult<()> {
    debug!(role_id = key.role_id, permission_id = key.permission_id, "Deleting role-permission association");
    if !state.store.delete_role_permission(&key).await? {
        return Err(ApiError::not_found("Role-permission association not found"));
    }
    Ok(ApiResponse::no_content())
}
