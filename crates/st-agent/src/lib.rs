//! st-agent: Tunnel agent for shuttle-tunnels
//!
//! The agent asks the lease service for a remote port, then hands the
//! tunnel over to the external tunneling library with that port as the
//! proxy's remote port. Leases are neither renewed nor released.

pub mod agent;
pub mod lease_client;

pub use agent::{AgentError, EstablishedTunnel, TunnelAgent};
pub use lease_client::{LeaseClient, LeaseClientError};
