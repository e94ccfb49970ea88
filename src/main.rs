use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use assistant_bridge::state::{AppState, BridgeConfig};
use assistant_bridge::tools;
use assistant_bridge::workflow::Orchestrator;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load env
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = BridgeConfig::from_env();
    info!(
        assistant = %config.assistant_api_url,
        host = %config.host_base_url,
        ingest_timeout_secs = config.ingest_timeout.as_secs_f64(),
        poll_interval_secs = config.poll_interval.as_secs_f64(),
        "Configuration loaded"
    );

    let bind_addr = config.bind_addr;
    let orchestrator = Arc::new(Orchestrator::new(config)?);
    let app = tools::router(AppState { orchestrator });

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Tool server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Tool server failed")?;

    info!("Tool server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
