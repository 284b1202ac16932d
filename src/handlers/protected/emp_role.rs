use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::debug;

use crate::app::AppState;
use crate::database::models::{EmpRole, EmpRoleKey};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /emprole/all
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<EmpRole>> {
    debug!("Getting all employee-role associations");
    Ok(ApiResponse::success(state.store.list_emp_roles().await?))
}

/// GET /emprole/employee/:emp_id
pub async fn by_employee(State(state): State<AppState>, Path(emp_id): Path<String>) -> ApiResult<Vec<EmpRole>> {
    debug!(emp_id = %emp_id, "Getting roles for employee");
    Ok(ApiResponse::success(state.store.emp_roles_by_employee(&emp_id).await?))
}

/// GET /emprole/role/:role_id
pub async fn by_role(State(state): State<AppState>, Path(role_id): Path<i32>) -> ApiResult<Vec<EmpRole>> {
    debug!(role_id, "Getting employees for role");
    Ok(ApiResponse::success(state.dependencies.emp_roles_by_role(role_id).await?))
}

/// POST /emprole
pub async fn create(State(state): State<AppState>, Json(key): Json<EmpRoleKey>) -> ApiResult<EmpRole> {
    debug!(emp_id = %key.emp_id, role_id = key.role_id, "Creating employee-role association");
    if state.store.emp_role_exists(&key).await? {
        return Err(ApiError::bad_request("This employee-role association already exists."));
    }

    let link = key.into_link(Utc::now());
    state.store.insert_emp_role(&link).await?;
    Ok(ApiResponse::created(link))
}

/// DELETE /emprole - the association is identified by the body
pub async fn delete(State(state): State<AppState>, Json(key): Json<EmpRoleKey>) -> ApiResult<()> {
    debug!(emp_id = %key.emp_id, role_id = key.role_id, "Deleting employee-role association");
    if !state.store.delete_emp_role(&key).await? {
        return Err(ApiError::not_found("Employee-role association not found"));
    }
    Ok(ApiResponse::no_content())
}
