//! Request Handlers
//!
//! The webhook endpoint authenticates the raw body before anything else
//! touches it, then hands the typed event to the wallet dispatcher.

use super::{errors::ApiError, middleware::RequestId};
use crate::{
    dispatch::dispatch,
    wallet::Wallet,
    webhooks::{WebhookHandler, WebhookResponse},
};
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state
pub struct AppState {
    pub webhooks: WebhookHandler,
    pub wallet: Arc<dyn Wallet>,
    /// Lowercased name of the header carrying the signature
    pub signature_header: String,
    pub version: String,
}

impl AppState {
    pub fn new(webhooks: WebhookHandler, wallet: Arc<dyn Wallet>, signature_header: &str) -> Self {
        Self {
            webhooks,
            wallet,
            signature_header: signature_header.trim().to_ascii_lowercase(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "Running".to_string(),
        version: state.version.clone(),
    })
}

/// POST {webhook_path}
pub async fn webhook_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let Some(signature) = headers
        .get(state.signature_header.as_str())
        .and_then(|value| value.to_str().ok())
    else {
        warn!("[{}] Webhook without usable {} header", request_id.0, state.signature_header);
        return Err(ApiError::unauthorized(
            request_id.0,
            format!("Missing {} header", state.signature_header),
        ));
    };

    let event = state
        .webhooks
        .verify_and_parse(&body, signature)
        .map_err(|e| {
            warn!("[{}] Rejected webhook: {}", request_id.0, e);
            ApiError::from_webhook(request_id.0.clone(), e)
        })?;

    info!(
        "[{}] {} webhook for player '{}' (tx {:?})",
        request_id.0, event.event_type, event.player_id, event.transaction_id
    );

    let reply = dispatch(state.wallet.as_ref(), &event).await;
    Ok(Json(reply))
}
