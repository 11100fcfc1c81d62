use std::future::Future;
use std::io;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::infrastructure::persistence::SessionFactory;
use crate::presentation::config::Settings;
use crate::presentation::router::create_router;
use crate::presentation::state::AppState;

/// Serves the API on `listener` until `shutdown` resolves, running the
/// startup hook once the listener is bound and the shutdown hook after the
/// last connection has drained.
pub async fn serve<S>(listener: TcpListener, state: AppState, shutdown: S) -> io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let settings = state.settings;
    let sessions = state.sessions.clone();

    on_startup(settings, &listener)?;

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    on_shutdown(&sessions).await;
    Ok(())
}

fn on_startup(settings: &Settings, listener: &TcpListener) -> io::Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, "Starting {} v{}", settings.app_name, settings.app_version);
    Ok(())
}

async fn on_shutdown(sessions: &SessionFactory) {
    info!("Shutting down application");
    sessions.close().await;
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
