use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::app::AppState;
use crate::error::ApiError;

/// Require a registered application name and its matching secret on every
/// non-public request
pub async fn api_key_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let security = &state.security;
    let path = request.uri().path();

    if security.is_public_path(path) {
        return Ok(next.run(request).await);
    }

    let application_name = header_value(request.headers(), &security.application_header)
        .ok_or_else(|| ApiError::unauthorized("Application Name missing"))?;

    let client = match state.store.find_api_client_by_name(&application_name).await? {
        Some(client) => client,
        None => {
            warn!(application = %application_name, path, "Unregistered application");
            return Err(ApiError::unauthorized("Application Name isn't registered"));
        }
    };

    let api_key = header_value(request.headers(), &security.api_key_header)
        .ok_or_else(|| ApiError::unauthorized("API key missing"))?;

    if !secrets_match(&api_key, &client.api_secret) {
        warn!(application = %application_name, path, "Rejected API key");
        return Err(ApiError::unauthorized("API Key is invalid"));
    }

    Ok(next.run(request).await)
}

/// Non-empty header value exactly as sent, if present and valid text
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Compare fixed-size digests so the comparison does not short-circuit on
/// the secret's content
fn secrets_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
