use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::RelayConfig,
    error::SERVICE_UNAVAILABLE,
    middleware::{make_span_with_request_id, request_id_middleware},
    services::providers::CompletionProvider,
};

pub mod chat;

/// Shared relay state
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn CompletionProvider>,
    pub upstream_timeout: Duration,
}

impl AppState {
    pub fn new(provider: Arc<dyn CompletionProvider>, config: &RelayConfig) -> Self {
        Self {
            provider,
            upstream_timeout: config.upstream_timeout(),
        }
    }
}

/// Creates the relay router with all routes and layers
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CatchPanicLayer::custom(panic_response)),
        )
}

/// Routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route("/test", get(liveness))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Liveness probe kept for existing frontends
async fn liveness() -> Json<Value> {
    Json(json!({ "message": "Backend is working fine!" }))
}

/// Turns a handler panic into the usual error body
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": SERVICE_UNAVAILABLE })),
    )
        .into_response()
}
