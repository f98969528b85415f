//! HTTP server for Persona.
//!
//! Serves the profile page at `/`, fresh profile JSON at `/api/info`, and a
//! health check at `/health`.

#![doc = include_str!("../README.md")]

pub mod routes;
pub mod state;

use std::net::SocketAddr;

use persona_core::Result;
use tracing::info;

pub use routes::router;
pub use state::{AppState, INFO_KEY};

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "serving profile page");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
