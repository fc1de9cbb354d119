//! `client` command: lease a remote port and run the tunnel client

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use st_agent::TunnelAgent;
use st_core::config::{self, AgentConfig};
use st_core::tunnel::FrpBackend;

use crate::output::{print_error, print_success};

/// Command-line values that take precedence over the config file
#[derive(Debug, Clone, Default)]
pub struct ClientOverrides {
    pub agent_id: Option<String>,
    pub server_api: Option<String>,
}

/// Load the agent config and apply command-line overrides
///
/// An explicit path must exist. Without one, the default agent config is
/// used when present and built-in defaults otherwise.
pub fn load_agent_config(path: Option<&Path>, overrides: &ClientOverrides) -> Result<AgentConfig> {
    let mut agent_config = match path {
        Some(path) => config::load_config::<AgentConfig>(path)
            .with_context(|| format!("Failed to load agent config from {:?}", path))?,
        None => {
            let default_path = config::default_agent_config_path();
            if default_path.exists() {
                config::load_config(&default_path).with_context(|| {
                    format!("Failed to load agent config from {:?}", default_path)
                })?
            } else {
                AgentConfig::default()
            }
        }
    };

    if let Some(agent_id) = &overrides.agent_id {
        agent_config.agent_id = agent_id.clone();
    }
    if let Some(server_api) = &overrides.server_api {
        agent_config.server_api = server_api.clone();
    }

    Ok(agent_config)
}

/// Run the agent until the tunnel stops or `cancel` fires
pub async fn client_command(agent_config: AgentConfig, cancel: CancellationToken) -> Result<()> {
    let backend = Arc::new(FrpBackend::new(agent_config.frp.clone()));

    let result = async {
        let agent = TunnelAgent::new(agent_config, backend)?;
        tracing::info!(
            "Requesting a remote port for agent {} from {}",
            agent.agent_id(),
            agent.config().server_api
        );
        let tunnel = agent.establish(cancel).await?;
        print_success(&format!(
            "Tunnel up: {}:{} is reachable on {}:{}",
            tunnel.spec.local_ip, tunnel.spec.local_port, tunnel.spec.server_addr, tunnel.remote_port
        ));
        tunnel.wait().await
    }
    .await;

    match result {
        Ok(()) => {
            tracing::info!("Tunnel client stopped");
            Ok(())
        }
        Err(e) => {
            let stage = e.stage();
            tracing::error!("Client failed during {}: {}", stage, e);
            print_error(&format!("{} failed: {}", stage, e));
            Err(e).with_context(|| format!("Client failed during {}", stage))
        }
    }
}
