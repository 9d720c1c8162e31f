use std::net::SocketAddr;

use anyhow::Context;
use server::{build_router, config::load_settings, AppState, TaskBoard};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let state = AppState::new(TaskBoard::new(), settings.clock_interval);
    let app = build_router(state);

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address {}", settings.server_bind))?;
    info!(%addr, clock_interval_ms = settings.clock_interval.as_millis() as u64, "server listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;
    Ok(())
}
