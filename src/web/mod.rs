//! Browser-facing form surface
//!
//! Serves the download pages and turns form submissions into batch runs.

pub mod handlers;
pub mod pages;
pub mod router;
pub mod state;

use std::net::SocketAddr;

pub use router::create_router;
pub use state::AppState;

use crate::core::config::AppConfig;
use crate::core::models::{AppError, AppResult};

/// Bind the configured address and serve until the process stops
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| AppError::Config(format!("Invalid listen address: {}", e)))?;

    let state = AppState::new(config)?;
    let app = create_router(state);

    tracing::info!("🌐 Serving download form on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    Ok(())
}
