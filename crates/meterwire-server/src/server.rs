//! Serve loop.

use tokio::net::TcpListener;

use meterwire_core::error::{MeterwireError, Result};

use crate::app_state::AppState;
use crate::config::AppConfig;
use crate::obs::TrackConnections;
use crate::router::build_router;

pub async fn run(cfg: AppConfig) -> Result<()> {
    let listen = cfg.server.listen_addr()?;
    let state = AppState::new(cfg)?;
    let app = build_router(state.clone());

    let listener = TcpListener::bind(listen)
        .await
        .map_err(|e| MeterwireError::Internal(format!("bind {listen} failed: {e}")))?;
    tracing::info!(%listen, "meterwire-server starting");

    axum::serve(listener, TrackConnections::new(app, state.connections().clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| MeterwireError::Internal(format!("server failed: {e}")))?;

    tracing::info!("meterwire-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received, draining connections");
}
