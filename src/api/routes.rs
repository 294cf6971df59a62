//! Route Definitions

use super::{
    handlers::{health_handler, webhook_handler, AppState},
    middleware::request_id_middleware,
};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the receiver router
pub fn create_router(state: Arc<AppState>, webhook_path: &str) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(webhook_path, post(webhook_handler))
        .with_state(state)
        // Outermost so every handler sees a RequestId
        .layer(axum::middleware::from_fn(request_id_middleware))
}
