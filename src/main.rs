use estate_pulse::config::Config;
use estate_pulse::insight::{GeminiProvider, InsightGenerator};
use estate_pulse::{router, AppState, DataPaths};
use std::{net::SocketAddr, sync::Arc};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    fs::create_dir_all(&config.data_dir).await?;

    if config.insight.api_key.is_none() {
        warn!("GEMINI_API_KEY is not set; insights will use the fallback text");
    }
    let provider = GeminiProvider::new(config.insight.clone())?;
    let generator = InsightGenerator::new(Arc::new(provider));

    let state = AppState::load(DataPaths::in_dir(&config.data_dir), generator).await;
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
