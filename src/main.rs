use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use access_api::config::{self, StoreBackend};
use access_api::database::models::ApiClientPayload;
use access_api::database::DatabaseManager;
use access_api::store::{AccessStore, MemoryStore, PgAccessStore};
use access_api::{app, AppState};

#[derive(Parser)]
#[command(name = "access-api")]
#[command(about = "Access-control API for roles, permissions and employee assignments")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides ACCESS_API_PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Store backend: postgres or memory (overrides STORE_BACKEND)")]
    backend: Option<StoreBackend>,

    #[arg(long, help = "Apply migrations at startup (overrides DATABASE_RUN_MIGRATIONS)")]
    migrate: Option<bool>,

    #[arg(
        long,
        env = "ACCESS_API_BOOTSTRAP_CLIENT",
        help = "Register NAME:SECRET as an API client at startup if the name is unknown"
    )]
    bootstrap_client: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = config::config();
    info!("Starting access API in {:?} mode", config.environment);

    let backend = args.backend.unwrap_or(config.database.backend);
    let security = config.security.clone();
    let lookup_timeout = config.validation.lookup_timeout();

    let state = match backend {
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to the access database")?;
            if args.migrate.unwrap_or(config.database.run_migrations) {
                DatabaseManager::migrate(&pool).await?;
            }
            let store = Arc::new(PgAccessStore::new(pool));
            bootstrap(store.as_ref(), args.bootstrap_client.as_deref()).await?;
            AppState::new(store, security, lookup_timeout)
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store, data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            bootstrap(store.as_ref(), args.bootstrap_client.as_deref()).await?;
            AppState::new(store, security, lookup_timeout)
        }
    };

    let port = args.port.unwrap_or(config.server.port);
    let bind_addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Access API listening on http://{}", bind_addr);
    app::serve(listener, state).await?;
    Ok(())
}

/// Make sure at least one client can call the API on a fresh store
async fn bootstrap(store: &dyn AccessStore, spec: Option<&str>) -> anyhow::Result<()> {
    let Some(spec) = spec else {
        return Ok(());
    };
    let (name, secret) = spec
        .split_once(':')
        .filter(|(name, secret)| !name.is_empty() && !secret.is_empty())
        .context("bootstrap client must look like NAME:SECRET")?;

    if store.find_api_client_by_name(name).await?.is_some() {
        return Ok(());
    }

    let client = store
        .insert_api_client(ApiClientPayload {
            id: None,
            application_name: name.to_string(),
            api_secret: secret.to_string(),
        })
        .await?;
    info!(id = client.id, application = %client.application_name, "Registered bootstrap API client");
    Ok(())
}
