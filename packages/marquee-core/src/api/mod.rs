//! HTTP API layer.
//!
//! This module contains thin handlers that delegate to the playback
//! pipeline. It provides the router construction and server startup.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use crate::bootstrap::BootstrappedServices;
use crate::services::PlaybackPipeline;

pub mod http;

/// Errors that can occur when starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Failed to bind to the TCP port, or the server loop failed.
    #[error("Failed to bind to port: {0}")]
    Bind(#[from] std::io::Error),
}

/// Shared application state for the API layer.
///
/// Immutable once built; handlers only read from it.
#[derive(Clone)]
pub struct AppState {
    /// Handles every inbound notification.
    pub pipeline: Arc<PlaybackPipeline>,
}

impl AppState {
    pub fn new(services: &BootstrappedServices) -> Self {
        Self {
            pipeline: Arc::clone(&services.pipeline),
        }
    }
}

/// Serves the webhook endpoint on `0.0.0.0:<port>` until `shutdown` resolves.
pub async fn start_server<F>(state: AppState, port: u16, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("Server listening on http://{}", addr);
    let app = http::create_router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
