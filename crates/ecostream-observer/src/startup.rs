//! Observer server startup helper for embedding in the engine binary.
//!
//! [`spawn_observer`] launches the HTTP + `WebSocket` server on a
//! background Tokio task so the API runs alongside the metrics and news
//! loops.

use std::sync::Arc;

use ecostream_core::control::ShutdownSignal;
use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError};
use crate::state::AppState;

/// Errors that can occur when spawning the Observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the Observer HTTP server on a background Tokio task.
///
/// The address is validated before the task is spawned so obvious
/// misconfigurations surface at startup. The server stops when
/// `shutdown` is requested; await the returned handle to wait for it.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the configured address cannot be
/// parsed.
pub fn spawn_observer(
    config: ServerConfig,
    state: Arc<AppState>,
    shutdown: Arc<ShutdownSignal>,
) -> Result<JoinHandle<()>, StartupError> {
    let addr = config.socket_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = crate::server::start_server(&config, state, shutdown).await {
            tracing::error!(error = %e, "Observer server exited with error");
        }
    });

    tracing::info!(%addr, "Observer server spawned on background task");

    Ok(handle)
}
