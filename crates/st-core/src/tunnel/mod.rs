//! Boundary to the external tunneling library
//!
//! Transport, proxy multiplexing, authentication and bandwidth shaping all
//! live in the tunneling library. This module only describes what to start
//! ([`ClientTunnelSpec`], [`ServerTunnelSpec`]) and how ([`TunnelBackend`]).

mod frp;

pub use frp::FrpBackend;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::config::{AgentConfig, PortRange, ServerConfig};
use crate::error::TunnelError;
use crate::types::AgentId;

/// Proxy type used for leased ports
pub const TCP_PROXY: &str = "tcp";

/// A tunnel library able to run clients and servers
///
/// Both operations block until the tunnel fails or `cancel` fires.
/// Cancellation is a clean exit and returns `Ok(())`.
#[async_trait]
pub trait TunnelBackend: Send + Sync {
    /// Run a tunnel client until failure or cancellation
    async fn run_client(
        &self,
        spec: ClientTunnelSpec,
        cancel: CancellationToken,
    ) -> Result<(), TunnelError>;

    /// Run a tunnel server until failure or cancellation
    async fn run_server(
        &self,
        spec: ServerTunnelSpec,
        cancel: CancellationToken,
    ) -> Result<(), TunnelError>;
}

/// Everything the tunnel library needs to expose one local service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTunnelSpec {
    /// Proxy name, the agent id
    pub name: String,
    pub local_ip: String,
    pub local_port: u16,
    /// Port leased on the tunnel server
    pub remote_port: u16,
    pub protocol: String,
    pub bandwidth_limit_mode: String,
    pub auth_method: String,
    pub auth_token: String,
    pub server_addr: String,
    pub server_port: u16,
    pub log_level: String,
    pub log_to: String,
}

impl ClientTunnelSpec {
    /// Build the client spec for `agent_id` with its leased `remote_port`
    pub fn from_agent_config(config: &AgentConfig, agent_id: &AgentId, remote_port: u16) -> Self {
        Self {
            name: agent_id.to_string(),
            local_ip: config.local_ip.clone(),
            local_port: config.local_port,
            remote_port,
            protocol: config.transport.protocol.clone(),
            bandwidth_limit_mode: config.transport.bandwidth_limit_mode.clone(),
            auth_method: config.auth.method.clone(),
            auth_token: config.auth.token.clone(),
            server_addr: config.server_addr.clone(),
            server_port: config.server_port,
            log_level: config.log.level.clone(),
            log_to: config.log.to.clone(),
        }
    }
}

/// Everything the tunnel library needs to run the server side
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTunnelSpec {
    pub bind_addr: String,
    pub bind_port: u16,
    pub auth_method: String,
    pub auth_token: String,
    /// Remote ports agents may claim, the lease range
    pub allow_ports: PortRange,
    pub log_level: String,
    pub log_to: String,
}

impl ServerTunnelSpec {
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            bind_addr: config.tunnel.bind_addr.clone(),
            bind_port: config.tunnel.bind_port,
            auth_method: config.tunnel.auth.method.clone(),
            auth_token: config.tunnel.auth.token.clone(),
            allow_ports: config.lease.port_range,
            log_level: config.log.level.clone(),
            log_to: config.log.to.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_spec_uses_leased_port() {
        let config = AgentConfig {
            local_port: 8888,
            server_port: 7000,
            ..AgentConfig::default()
        };
        let spec = ClientTunnelSpec::from_agent_config(&config, &AgentId::from("a1"), 10004);

        assert_eq!(spec.name, "a1");
        assert_eq!(spec.local_port, 8888);
        assert_eq!(spec.remote_port, 10004);
        assert_eq!(spec.server_port, 7000);
    }

    #[test]
    fn test_server_spec_allows_lease_range() {
        let mut config = ServerConfig::default();
        config.lease.port_range = PortRange::new(20000, 20100);
        let spec = ServerTunnelSpec::from_server_config(&config);

        assert_eq!(spec.allow_ports, PortRange::new(20000, 20100));
        assert_eq!(spec.bind_port, 7000);
    }
}
