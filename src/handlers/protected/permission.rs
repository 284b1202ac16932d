use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::debug;

use crate::app::AppState;
use crate::database::models::{Permission, PermissionPayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

fn permission_not_found(permission_id: i32) -> ApiError {
    ApiError::not_found(format!("Permission {} not found", permission_id))
}

/// GET /permission/all
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Permission>> {
    debug!("Getting all permissions");
    Ok(ApiResponse::success(state.store.list_permissions().await?))
}

/// GET /permission/:id
pub async fn get(State(state): State<AppState>, Path(permission_id): Path<i32>) -> ApiResult<Permission> {
    debug!(permission_id, "Getting permission");
    let permission = state
        .store
        .find_permission(permission_id)
        .await?
        .ok_or_else(|| permission_not_found(permission_id))?;
    Ok(ApiResponse::success(permission))
}

/// GET /permission/system/:system_id
pub async fn by_system(State(state): State<AppState>, Path(system_id): Path<i32>) -> ApiResult<Vec<Permission>> {
    debug!(system_id, "Getting permissions for system");
    Ok(ApiResponse::success(state.store.permissions_by_system(system_id).await?))
}

/// POST /permission
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<PermissionPayload>,
) -> ApiResult<Permission> {
    debug!(permission_id = payload.permission_id, "Creating permission");
    if state.store.find_permission(payload.permission_id).await?.is_some() {
        return Err(ApiError::bad_request("Permission with this ID already exists."));
    }

    let permission = payload.into_permission(Utc::now());
    state.store.insert_permission(&permission).await?;
    Ok(ApiResponse::created(permission))
}

/// PUT /permission/:id
pub async fn update(
    State(state): State<AppState>,
    Path(permission_id): Path<i32>,
    Json(payload): Json<PermissionPayload>,
) -> ApiResult<()> {
    debug!(permission_id, "Updating permission");
    if payload.permission_id != permission_id {
        return Err(ApiError::bad_request("Permission ID mismatch."));
    }

    let permission = payload.into_permission(Utc::now());
    if !state.store.update_permission(&permission).await? {
        return Err(permission_not_found(permission_id));
    }
    Ok(ApiResponse::no_content())
}

/// DELETE /permission/:id
pub async fn delete(State(state): State<AppState>, Path(permission_id): Path<i32>) -> ApiResult<()> {
    debug!(permission_id, "Deleting permission");
    if !state.store.delete_permission(permission_id).await? {
        return Err(permission_not_found(permission_id));
    }
    Ok(ApiResponse::no_content())
}
