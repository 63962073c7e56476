use anyhow::{Context, Result};
use redactkit_proxy::ProxyConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ProxyConfig::from_env().context("Failed to load configuration")?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting redaction proxy");

    redactkit_proxy::serve(config).await.context("Server error")?;
    Ok(())
}
