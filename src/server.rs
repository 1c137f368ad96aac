use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{QueryConfig, SecurityConfig};
use crate::database::ToolRepository;
use crate::error::ApiError;
use crate::handlers;
use crate::middleware::jwt_auth_middleware;
use crate::query::ToolQueryEngine;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub engine: ToolQueryEngine,
    pub repository: Arc<dyn ToolRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn ToolRepository>, query: QueryConfig) -> Self {
        Self {
            engine: ToolQueryEngine::new(repository.clone(), query),
            repository,
        }
    }
}

/// Full application router
pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/health", get(handlers::health))
        // Protected API
        .merge(tool_routes())
        .fallback(not_found)
        .with_state(state);

    let router = if security.enable_cors {
        router.layer(cors_layer(security))
    } else {
        router
    };

    router.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

fn tool_routes() -> Router<AppState> {
    Router::new()
        .route("/api/tools", get(handlers::tool_list).post(handlers::tool_create))
        .route("/api/tools/categories", get(handlers::tool_categories))
        .route("/api/tools/tags", get(handlers::tool_tags))
        .route("/api/tools/:id", put(handlers::tool_update).delete(handlers::tool_delete))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let allow_origin = if security.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = security
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
