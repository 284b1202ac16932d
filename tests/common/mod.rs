#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::{RequestBuilder, StatusCode};

use access_api::config::SecurityConfig;
use access_api::database::models::{ApiClientPayload, Permission, Role};
use access_api::store::{AccessStore, MemoryStore};
use access_api::{app, AppState};

pub const APP_NAME: &str = "test-suite";
pub const APP_SECRET: &str = "test-secret";

/// A server running the real router on its own port, backed by a fresh
/// in-memory store. Lives as long as the test's runtime.
pub struct TestApp {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request carrying valid credentials
    pub fn authed(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .header("Application-Name", APP_NAME)
            .header("API-Key", APP_SECRET)
    }

    /// Request with no credentials at all
    pub fn anonymous(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn spawn_app() -> Result<TestApp> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_api_client(ApiClientPayload {
            id: None,
            application_name: APP_NAME.to_string(),
            api_secret: APP_SECRET.to_string(),
        })
        .await?;

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    let state = AppState::new(store.clone(), SecurityConfig::default(), Duration::from_secs(2));
    tokio::spawn(async move {
        let _ = app::serve(listener, state).await;
    });

    let app = TestApp {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        client: reqwest::Client::new(),
    };
    app.wait_ready(Duration::from_secs(5)).await?;
    Ok(app)
}

pub async fn seed_role(store: &MemoryStore, role_id: i32, name: &str) -> Result<()> {
    let now = Utc::now();
    store
        .insert_role(&Role {
            role_id,
            role_name: name.to_string(),
            role_description: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok(())
}

pub async fn seed_permission(store: &MemoryStore, permission_id: i32, name: &str, system_id: i32) -> Result<()> {
    let now = Utc::now();
    store
        .insert_permission(&Permission {
            permission_id,
            permission_name: name.to_string(),
            permission_description: None,
            system_id,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok(())
}
