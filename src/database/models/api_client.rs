use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Credentials of an application allowed to call the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApiClient {
    pub id: i32,
    pub application_name: String,
    pub api_secret: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClientPayload {
    #[serde(default)]
    pub id: Option<i32>,
    pub application_name: String,
    pub api_secret: String,
}
