//! `reserve` command: lease one port and print it

use std::time::Duration;

use anyhow::{Context, Result};

use st_agent::LeaseClient;
use st_core::AgentId;

/// Reserve a port from the lease service at `server_api`
pub async fn reserve_command(
    server_api: &str,
    agent_id: Option<&str>,
    timeout: Duration,
) -> Result<u16> {
    let agent_id = AgentId::resolve(agent_id.unwrap_or_default());
    let client = LeaseClient::new(server_api, timeout)?;

    let reservation = client
        .reserve_port(&agent_id)
        .await
        .with_context(|| format!("Failed to reserve a port from {}", client.base_url()))?;

    tracing::info!("{} (port {})", reservation.message, reservation.port);
    Ok(reservation.port)
}
