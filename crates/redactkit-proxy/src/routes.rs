//! HTTP API.

use crate::error::{ProxyError, ProxyResult};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use redactkit_core::{
    restore, ModeRouter, RedactionMap, RedactionMode, RedactionOptions, RedactionOutcome,
    RedactionResult,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared handler state.
pub struct AppState {
    pub router: ModeRouter,
}

/// Build the proxy's router.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/redact", post(redact))
        .route("/v1/restore", post(restore_text))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Deserialize)]
pub struct RedactRequest {
    pub text: String,
    #[serde(default)]
    pub scope_id: Option<String>,
    #[serde(default)]
    pub include_names: Option<bool>,
    #[serde(default)]
    pub include_addresses: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct RedactResponse {
    pub status: &'static str,
    pub mode: RedactionMode,
    #[serde(flatten)]
    pub result: RedactionResult,
}

async fn redact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RedactRequest>,
) -> ProxyResult<Json<RedactResponse>> {
    let defaults = RedactionOptions::default();
    let options = RedactionOptions::builder()
        .include_names(req.include_names.unwrap_or(defaults.include_names))
        .include_addresses(req.include_addresses.unwrap_or(defaults.include_addresses))
        .build();

    match state.router.redact(&req.text, &options, req.scope_id.as_deref()).await {
        RedactionOutcome::Completed { mode, result } => Ok(Json(RedactResponse {
            status: "completed",
            mode,
            result,
        })),
        // The caller already holds the original; it is not echoed back.
        RedactionOutcome::FailedClosed { mode, error, .. } => {
            Err(ProxyError::FailedClosed { mode, source: error })
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    pub redacted_text: String,
    pub redaction_map: RedactionMap,
}

#[derive(Debug, Serialize)]
pub struct RestoreResponse {
    pub content: String,
}

async fn restore_text(Json(req): Json<RestoreRequest>) -> Json<RestoreResponse> {
    Json(RestoreResponse {
        content: restore(&req.redacted_text, &req.redaction_map),
    })
}
