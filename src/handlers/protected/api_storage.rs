use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use tracing::debug;

use crate::app::AppState;
use crate::database::models::{ApiClient, ApiClientPayload};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /apistorage/all
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ApiClient>> {
    debug!("Getting all API storages");
    Ok(ApiResponse::success(state.store.list_api_clients().await?))
}

/// GET /apistorage/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<ApiClient> {
    debug!(id, "Getting API storage");
    let client = state
        .store
        .find_api_client(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("API storage {} not found", id)))?;
    Ok(ApiResponse::success(client))
}

/// POST /apistorage - id is assigned by the store when omitted
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ApiClientPayload>,
) -> ApiResult<ApiClient> {
    debug!(application = %payload.application_name, "Creating API storage");
    let client = state.store.insert_api_client(payload).await?;
    Ok(ApiResponse::created(client))
}

/// PUT /apistorage/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ApiClientPayload>,
) -> ApiResult<()> {
    debug!(id, "Updating API storage");
    if payload.id != Some(id) {
        return Err(ApiError::bad_request("API Storage ID mismatch."));
    }

    let now = Utc::now();
    let client = ApiClient {
        id,
        application_name: payload.application_name,
        api_secret: payload.api_secret,
        created_at: now,
        updated_at: now,
    };

    if !state.store.update_api_client(&client).await? {
        return Err(ApiError::not_found(format!("API storage {} not found", id)));
    }
    Ok(ApiResponse::no_content())
}

/// DELETE /apistorage/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    debug!(id, "Deleting API storage");
    if !state.store.delete_api_client(id).await? {
        return Err(ApiError::not_found(format!("API storage {} not found", id)));
    }
    Ok(ApiResponse::no_content())
}
