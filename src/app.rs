use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::{HeaderValue, Uri},
    middleware::{from_fn_with_state, map_request},
    routing::{get, post},
    Router, ServiceExt,
};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::handlers::{protected, public};
use crate::middleware::{api_key_middleware, deletion_guard_middleware};
use crate::services::{DeletionValidator, DependencyLookup};
use crate::store::{AccessStore, DependencySource};

/// Shared by every handler and middleware. Cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccessStore>,
    pub dependencies: Arc<dyn DependencySource>,
    pub security: Arc<SecurityConfig>,
    pub lookup_timeout: Duration,
}

impl AppState {
    pub fn new<S>(store: Arc<S>, security: SecurityConfig, lookup_timeout: Duration) -> Self
    where
        S: AccessStore + DependencySource + 'static,
    {
        Self {
            store: store.clone(),
            dependencies: store,
            security: Arc::new(security),
            lookup_timeout,
        }
    }

    /// Fresh validator over this state's dependency source
    pub fn deletion_validator(&self) -> DeletionValidator {
        DeletionValidator::new(DependencyLookup::new(self.dependencies.clone(), self.lookup_timeout))
    }
}

/// Full application router. Layers run outermost first: trace, CORS,
/// API key gate, deletion guard, handler.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.security);

    Router::new()
        // Public
        .route("/health", get(public::health))
        // Protected
        .merge(api_storage_routes())
        .merge(role_routes())
        .merge(permission_routes())
        .merge(emp_role_routes())
        .merge(role_permission_routes())
        .layer(from_fn_with_state(state.clone(), deletion_guard_middleware))
        .layer(from_fn_with_state(state.clone(), api_key_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the router with route names matched case-insensitively
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    let app = map_request(canonical_route_path).layer(router(state));
    axum::serve(listener, app.into_make_service()).await
}

/// Fixed second-level route segments, e.g. `/role/all`, `/emprole/employee/..`
const ROUTE_KEYWORDS: [&str; 5] = ["all", "employee", "role", "permission", "system"];

/// Lowercase the resource segment, and the second segment when it is a
/// route keyword. Parameters such as employee ids keep their case.
pub fn canonical_path(path: &str) -> Option<String> {
    let mut segments: Vec<String> = path.split('/').map(str::to_string).collect();

    if let Some(resource) = segments.get_mut(1) {
        *resource = resource.to_ascii_lowercase();
    }
    if let Some(action) = segments.get_mut(2) {
        let lower = action.to_ascii_lowercase();
        if ROUTE_KEYWORDS.contains(&lower.as_str()) {
            *action = lower;
        }
    }

    let canonical = segments.join("/");
    (canonical != path).then_some(canonical)
}

async fn canonical_route_path(mut request: Request) -> Request {
    let Some(path) = canonical_path(request.uri().path()) else {
        return request;
    };

    let path_and_query = match request.uri().query() {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };
    let mut parts = request.uri().clone().into_parts();
    match path_and_query.parse() {
        Ok(value) => parts.path_and_query = Some(value),
        Err(_) => return request,
    }
    if let Ok(uri) = Uri::from_parts(parts) {
        *request.uri_mut() = uri;
    }
    request
}

fn api_storage_routes() -> Router<AppState> {
    use protected::api_storage;

    Router::new()
        .route("/apistorage", post(api_storage::create))
        .route("/apistorage/all", get(api_storage::list))
        .route(
            "/apistorage/:id",
            get(api_storage::get)
                .put(api_storage::update)
                .delete(api_storage::delete),
        )
}

fn role_routes() -> Router<AppState> {
    use protected::role;

    Router::new()
        .route("/role", post(role::create))
        .route("/role/all", get(role::list))
        .route("/role/:id", get(role::get).put(role::update).delete(role::delete))
}

fn permission_routes() -> Router<AppState> {
    use protected::permission;

    Router::new()
        .route("/permission", post(permission::create))
        .route("/permission/all", get(permission::list))
        .route("/permission/system/:system_id", get(permission::by_system))
        .route(
            "/permission/:id",
            get(permission::get)
                .put(permission::update)
                .delete(permission::delete),
        )
}

fn emp_role_routes() -> Router<AppState> {
    use protected::emp_role;

    Router::new()
        .route("/emprole", post(emp_role::create).delete(emp_role::delete))
        .route("/emprole/all", get(emp_role::list))
        .route("/emprole/employee/:emp_id", get(emp_role::by_employee))
        .route("/emprole/role/:role_id", get(emp_role::by_role))
}

fn role_permission_routes() -> Router<AppState> {
    use protected::role_permission;

    Router::new()
        .route(
            "/rolepermission",
            post(role_permission::create).delete(role_permission::delete),
        )
        .route("/rolepermission/all", get(role_permission::list))
        .route("/rolepermission/role/:role_id", get(role_permission::by_role))
        .route(
            "/rolepermission/permission/:permission_id",
            get(role_permission::by_permission),
        )
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
