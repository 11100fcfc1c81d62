use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use yavin::infrastructure::observability::{LogArchiver, init_tracing};
use yavin::infrastructure::persistence::SessionFactory;
use yavin::presentation::{AppState, get_settings, serve, shutdown_signal};

const LOG_ARCHIVE_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = get_settings().context("Failed to load settings")?;

    let tracing_config = settings.tracing();
    let _tracing_guard = init_tracing(&tracing_config).context("Failed to initialize tracing")?;
    tracing::debug!(settings = ?settings, "Settings loaded");

    let log_archiver = LogArchiver::new(&tracing_config).spawn(LOG_ARCHIVE_INTERVAL);

    let sessions = SessionFactory::new(&settings.database())
        .context("Failed to create database session factory")?;

    let state = AppState { settings, sessions };

    let addr = format!("{}:{}", settings.server_host, settings.server_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on {}", addr);

    serve(listener, state, shutdown_signal()).await?;

    log_archiver.abort();
    Ok(())
}
