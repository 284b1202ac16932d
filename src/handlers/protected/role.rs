use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::debug;

use crate::app::AppState;
use crate::database::models::{Role, RolePayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

fn role_not_found(role_id: i32) -> ApiError {
    ApiError::not_found(format!("Role {} not found", role_id))
}

/// GET /role/all
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Role>> {
    debug!("Getting all roles");
    Ok(ApiResponse::success(state.store.list_roles().await?))
}

/// GET /role/:id
pub async fn get(State(state): State<AppState>, Path(role_id): Path<i32>) -> ApiResult<Role> {
    debug!(role_id, "Getting role");
    let role = state.store.find_role(role_id).await?.ok_or_else(|| role_not_found(role_id))?;
    Ok(ApiResponse::success(role))
}

/// POST /role
pub async fn create(State(state): State<AppState>, Json(payload): Json<RolePayload>) -> ApiResult<Role> {
    debug!(role_id = payload.role_id, role_name = %payload.role_name, "Creating role");
    if state.store.find_role(payload.role_id).await?.is_some() {
        return Err(ApiError::bad_request("Role with this ID already exists."));
    }

    let role = payload.into_role(Utc::now());
    state.store.insert_role(&role).await?;
    Ok(ApiResponse::created(role))
}

/// PUT /role/:id - createdAt is kept, updatedAt refreshed
pub async fn update(
    State(state): State<AppState>,
    Path(role_id): Path<i32>,
    Json(payload): Json<RolePayload>,
) -> ApiResult<()> {
    debug!(role_id, "Updating role");
    if payload.role_id != role_id {
        return Err(ApiError::bad_request("Role ID mismatch."));
    }

    let role = payload.into_role(Utc::now());
    if !state.store.update_role(&role).await? {
        return Err(role_not_found(role_id));
    }
    Ok(ApiResponse::no_content())
}

/// DELETE /role/:id - only reached once the deletion guard found no references
pub async fn delete(State(state): State<AppState>, Path(role_id): Path<i32>) -> ApiResult<()> {
    debug!(role_id, "Deleting role");
    if !state.store.delete_role(role_id).await? {
        return Err(role_not_found(role_id));
    }
    Ok(ApiResponse::no_content())
}
