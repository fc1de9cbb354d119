//! Lease API server
//!
//! Serves the lease API with axum on a TCP listener and stops gracefully
//! when its shutdown token fires.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use st_protocol::{HEALTH_PATH, LEASES_PATH, RESERVE_PORT_PATH};

use super::handlers;
use crate::state::ServerState;

/// Build the lease API router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(RESERVE_PORT_PATH, post(handlers::reserve_port))
        .route(LEASES_PATH, get(handlers::list_leases))
        .route(HEALTH_PATH, get(handlers::health))
        .with_state(state)
}

/// HTTP server for the lease API
pub struct LeaseServer {
    /// Address to bind
    pub address: String,
    /// Lease service state
    state: Arc<ServerState>,
    /// Cancellation token for shutdown
    shutdown_token: Option<CancellationToken>,
}

impl LeaseServer {
    /// Create a new lease server
    pub fn new(address: String, state: Arc<ServerState>) -> Self {
        Self {
            address,
            state,
            shutdown_token: None,
        }
    }

    /// Set the shutdown token (call before run)
    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown_token = Some(token);
        self
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(&self) -> std::io::Result<()> {
        let listener = TcpListener::bind(&self.address).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener until shutdown
    pub async fn serve(&self, listener: TcpListener) -> std::io::Result<()> {
        let local_addr = listener.local_addr()?;
        tracing::info!("Lease API listening on {}", local_addr);

        let token = self.shutdown_token.clone().unwrap_or_default();
        axum::serve(listener, router(Arc::clone(&self.state)))
            .with_graceful_shutdown(async move { token.cancelled().await })
            .await?;

        tracing::info!("Lease API on {} stopped", local_addr);
        Ok(())
    }
}
