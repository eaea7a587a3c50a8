//! Translate function server
//!
//! Usage:
//!   cargo run --bin translate-server
//!
//! Required environment variables:
//! - DEEPL_API_KEY (unless every caller sends X-DeepL-API-Key)
//!
//! Optional:
//! - SERVICE_BEARER_TOKEN (require `Authorization: Bearer <token>`)
//! - DEEPL_API_URL (defaults to the DeepL free endpoint)
//! - PORT (defaults to 8080)

use anyhow::{Context, Result};
use locale_translator::{
    config::Config,
    service::{router, AppState, TRANSLATE_PATH},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_translator=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    if config.deepl_api_key.is_none() {
        warn!("DEEPL_API_KEY is not set; requests must carry X-DeepL-API-Key");
    }
    if config.service_bearer_token.is_none() {
        warn!("SERVICE_BEARER_TOKEN is not set; the endpoint is unauthenticated");
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(Arc::new(AppState::new(config)));

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}{}", addr, TRANSLATE_PATH);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
