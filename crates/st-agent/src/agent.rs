//! Tunnel agent
//!
//! Startup runs in two stages, each with its own error:
//!
//! 1. **Lease acquisition** - ask the lease service for a remote port. Any
//!    failure ends startup here; no tunnel is started.
//! 2. **Tunnel startup** - build the client spec with the leased port and
//!    hand it to the tunnel backend, which holds the tunnel from then on.
//!    Once the tunnel process runs, its exit is reported as the **tunnel**
//!    stage instead.
//!
//! The lease is not renewed while the tunnel runs. Once its TTL passes the
//! lease service may give the same port to another agent.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use st_core::config::AgentConfig;
use st_core::tunnel::{ClientTunnelSpec, TunnelBackend};
use st_core::{AgentId, ConfigError, TunnelError};

use crate::lease_client::{LeaseClient, LeaseClientError};

/// Agent failures, by stage
#[derive(Debug, Error)]
pub enum AgentError {
    /// Invalid agent configuration
    #[error("Invalid agent config: {0}")]
    Config(#[from] ConfigError),

    /// No remote port could be leased
    #[error("Failed to acquire a remote port: {0}")]
    LeaseAcquisition(#[from] LeaseClientError),

    /// The tunnel library failed
    #[error("Tunnel failed: {0}")]
    Tunnel(#[from] TunnelError),

    /// The tunnel task panicked or was aborted
    #[error("Tunnel task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AgentError {
    /// Stage that failed, for logs
    pub fn stage(&self) -> &'static str {
        match self {
            AgentError::Config(_) => "configuration",
            AgentError::LeaseAcquisition(_) => "lease acquisition",
            AgentError::Tunnel(TunnelError::Exited { .. }) | AgentError::Task(_) => "tunnel",
            AgentError::Tunnel(_) => "tunnel startup",
        }
    }
}

/// A tunnel handed over to the backend
pub struct EstablishedTunnel {
    /// Port leased on the tunnel server
    pub remote_port: u16,
    /// Spec the backend was started with
    pub spec: ClientTunnelSpec,
    /// Resolves when the backend stops
    pub handle: JoinHandle<Result<(), TunnelError>>,
}

impl EstablishedTunnel {
    /// Wait for the tunnel to stop
    pub async fn wait(self) -> Result<(), AgentError> {
        self.handle.await??;
        Ok(())
    }
}

/// Leases a remote port and starts the tunnel client
pub struct TunnelAgent {
    config: AgentConfig,
    agent_id: AgentId,
    lease_client: LeaseClient,
    backend: Arc<dyn TunnelBackend>,
}

impl TunnelAgent {
    /// Create a new agent
    pub fn new(config: AgentConfig, backend: Arc<dyn TunnelBackend>) -> Result<Self, AgentError> {
        config.validate()?;
        let agent_id = AgentId::resolve(&config.agent_id);
        let lease_client = LeaseClient::new(config.server_api.clone(), config.request_timeout)?;

        Ok(Self {
            config,
            agent_id,
            lease_client,
            backend,
        })
    }

    /// Get the agent configuration
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Identifier presented to the lease service
    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Lease a remote port from the lease service
    pub async fn acquire_remote_port(&self) -> Result<u16, AgentError> {
        let reservation = self.lease_client.reserve_port(&self.agent_id).await?;
        tracing::info!(
            "Leased remote port {} for agent {}",
            reservation.port,
            self.agent_id
        );
        Ok(reservation.port)
    }

    /// Lease a port and start the tunnel in the background
    ///
    /// Returns as soon as the backend has the client spec, so callers
    /// learn the remote port before the tunnel stops.
    pub async fn establish(&self, cancel: CancellationToken) -> Result<EstablishedTunnel, AgentError> {
        let remote_port = self.acquire_remote_port().await?;
        let spec = ClientTunnelSpec::from_agent_config(&self.config, &self.agent_id, remote_port);

        tracing::info!(
            "Starting tunnel {}:{} -> {}:{} (remote port {})",
            spec.local_ip,
            spec.local_port,
            spec.server_addr,
            spec.server_port,
            remote_port
        );

        let backend = Arc::clone(&self.backend);
        let task_spec = spec.clone();
        let handle = tokio::spawn(async move { backend.run_client(task_spec, cancel).await });

        Ok(EstablishedTunnel {
            remote_port,
            spec,
            handle,
        })
    }

    /// Lease a port and run the tunnel until it stops or `cancel` fires
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), AgentError> {
        self.establish(cancel).await?.wait().await
    }
}
