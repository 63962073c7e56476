//! # redactkit-proxy
//!
//! HTTP front for the redaction engine. Callers send text bound for an
//! external model and get back placeholders plus the map needed to restore
//! the model's answer. When the remote path is selected and fails, the proxy
//! answers `503` and forwards nothing.

pub mod client;
pub mod config;
pub mod error;
pub mod routes;

pub use client::HttpRedactionService;
pub use config::{ProxyConfig, RemoteMode};
pub use error::{ProxyError, ProxyResult};
pub use routes::{app, AppState};

use redactkit_core::router::{LocalRedactor, RemoteRedactor};
use redactkit_core::{ModePolicy, ModeRouter, Redactor};
use std::sync::Arc;
use tracing::{info, warn};

/// Wire the mode router described by `config`.
pub fn build_mode_router(config: &ProxyConfig) -> ModeRouter {
    let policy: Arc<dyn ModePolicy> = Arc::new(config.remote_mode.policy());
    let router = ModeRouter::new(policy, LocalRedactor::new(Arc::new(Redactor::new())));

    match &config.remote_url {
        Some(url) => {
            let service = HttpRedactionService::new(url.clone());
            info!(
                endpoint = service.endpoint(),
                mode = ?config.remote_mode,
                "Remote redaction service configured"
            );
            let remote = RemoteRedactor::new(Arc::new(service))
                .with_enable_ai(config.enable_ai)
                .with_timeout(config.remote_timeout);
            router.with_remote(remote)
        }
        None => {
            if config.remote_mode != RemoteMode::Off {
                warn!(
                    "Remote mode enabled without REDACTKIT_REMOTE_URL; remote calls will fail closed"
                );
            }
            router
        }
    }
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: ProxyConfig) -> ProxyResult<()> {
    let state = Arc::new(AppState {
        router: build_mode_router(&config),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(address = %config.bind_addr, "Redaction proxy listening");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
