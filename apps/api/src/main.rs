mod config;
mod errors;
mod llm_client;
mod routes;
mod simplify;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::simplify::service::SimplificationService;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ClarityBot API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client; the API key moves into it and is never logged
    let llm = LlmClient::new(
        config.openrouter_api_key,
        config.openrouter_api_url.clone(),
        config.upstream_timeout,
    )?;
    info!(
        "LLM client initialized (model: {}, endpoint: {}, timeout: {:?})",
        llm_client::MODEL,
        config.openrouter_api_url,
        config.upstream_timeout
    );

    // Build app state
    let state = AppState {
        simplifier: Arc::new(SimplificationService::new(Arc::new(llm))),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS origins to the deployed UI host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
