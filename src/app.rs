use std::sync::Arc;

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::Authorizer;
use crate::config::SecurityConfig;
use crate::database::DrinkStore;
use crate::error::ApiError;
use crate::handlers;

/// Per-request dependencies handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DrinkStore>,
    pub authorizer: Arc<Authorizer>,
}

impl AppState {
    pub fn new(store: Arc<dyn DrinkStore>, authorizer: Arc<Authorizer>) -> Self {
        Self { store, authorizer }
    }
}

pub fn app(state: AppState, security: &SecurityConfig) -> Router {
    let router = Router::new()
        // Public
        .route("/", get(root).fallback(method_not_allowed))
        .route("/health", get(health).fallback(method_not_allowed))
        .merge(drink_routes())
        .fallback(not_found);

    let router = match cors_layer(security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

fn drink_routes() -> Router<AppState> {
    use axum::routing::patch;
    use handlers::{protected, public};

    Router::new()
        .route(
            "/drinks",
            get(public::drinks_get)
                .post(protected::drinks_post)
                .fallback(method_not_allowed),
        )
        .route(
            "/drinks-detail",
            get(protected::drinks_detail_get).fallback(method_not_allowed),
        )
        .route(
            "/drinks/:id",
            patch(protected::drink_patch)
                .delete(protected::drink_delete)
                .fallback(method_not_allowed),
        )
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    if security.cors_origins.is_empty() {
        return Some(CorsLayer::permissive());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Drinks API",
            "version": version,
            "endpoints": {
                "drinks": "GET /drinks (public), POST /drinks (post:drinks)",
                "detail": "GET /drinks-detail (get:drinks-detail)",
                "drink": "PATCH /drinks/:id (patch:drinks), DELETE /drinks/:id (delete:drinks)",
                "health": "GET /health (public)",
            }
        }
    }))
}

async fn health(axum::extract::State(state): axum::extract::State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("database unavailable").into_response()
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::resource_not_found()
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("method not allowed")
}
