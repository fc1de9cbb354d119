//! Server runtime
//!
//! Runs the lease API, the optional lease sweep and the tunnel server side
//! by side. Whichever of the lease API and the tunnel server stops first
//! takes the other one down with it.

use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use st_core::config::ServerConfig;
use st_core::tunnel::{ServerTunnelSpec, TunnelBackend};
use st_core::{ConfigError, TunnelError};

use crate::api::LeaseServer;
use crate::lease::run_lease_sweep;
use crate::state::ServerState;

/// Server failures, by stage
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid server configuration
    #[error("Invalid server config: {0}")]
    Config(#[from] ConfigError),

    /// Lease API failed to bind or stopped unexpectedly
    #[error("Lease service failed: {0}")]
    LeaseService(#[source] std::io::Error),

    /// Tunnel server failed
    #[error("Tunnel server failed: {0}")]
    Tunnel(#[from] TunnelError),

    /// Tunnel server exited cleanly without being asked to
    #[error("Tunnel server stopped unexpectedly")]
    TunnelStopped,
}

impl ServerError {
    /// Stage that failed, for logs
    pub fn stage(&self) -> &'static str {
        match self {
            ServerError::Config(_) => "configuration",
            ServerError::LeaseService(_) => "lease service",
            ServerError::Tunnel(_) | ServerError::TunnelStopped => "tunnel server",
        }
    }
}

/// Bind the lease API from `config` and run the server until `cancel` fires
/// or either half fails
pub async fn run_server(
    config: ServerConfig,
    backend: &dyn TunnelBackend,
    cancel: CancellationToken,
) -> Result<(), ServerError> {
    config.validate()?;
    let listener = TcpListener::bind(&config.lease.api_bind_address)
        .await
        .map_err(ServerError::LeaseService)?;
    serve_with_listener(config, listener, backend, cancel).await
}

/// Run the server with the lease API on an already bound listener
pub async fn serve_with_listener(
    config: ServerConfig,
    listener: TcpListener,
    backend: &dyn TunnelBackend,
    cancel: CancellationToken,
) -> Result<(), ServerError> {
    config.validate()?;

    let state = Arc::new(ServerState::new(config.lease.clone()));
    let service_cancel = cancel.child_token();

    let range = state.allocator().range();
    tracing::info!(
        "Leasing {} ports {}-{} (ttl: {:?})",
        range.len(),
        range.start,
        range.end,
        state.allocator().ttl()
    );

    if let Some(interval) = config.lease.sweep() {
        tokio::spawn(run_lease_sweep(
            Arc::clone(state.allocator()),
            interval,
            service_cancel.clone(),
        ));
    }

    let lease_server = LeaseServer::new(config.lease.api_bind_address.clone(), state)
        .with_shutdown_token(service_cancel.clone());
    let mut lease_task = tokio::spawn(async move { lease_server.serve(listener).await });

    let spec = ServerTunnelSpec::from_server_config(&config);
    tracing::info!(
        "Starting tunnel server on {}:{}",
        spec.bind_addr,
        spec.bind_port
    );
    let tunnel = backend.run_server(spec, service_cancel.clone());

    tokio::select! {
        result = &mut lease_task => {
            service_cancel.cancel();
            match result {
                Ok(Ok(())) if cancel.is_cancelled() => Ok(()),
                Ok(Ok(())) => Err(ServerError::LeaseService(std::io::Error::other(
                    "lease service stopped unexpectedly",
                ))),
                Ok(Err(e)) => Err(ServerError::LeaseService(e)),
                Err(e) => Err(ServerError::LeaseService(std::io::Error::other(e))),
            }
        }
        result = tunnel => {
            service_cancel.cancel();
            if let Err(e) = lease_task.await {
                tracing::warn!("Lease service task failed during shutdown: {}", e);
            }
            match result {
                Ok(()) if cancel.is_cancelled() => Ok(()),
                Ok(()) => Err(ServerError::TunnelStopped),
                Err(e) => Err(ServerError::Tunnel(e)),
            }
        }
    }
}
