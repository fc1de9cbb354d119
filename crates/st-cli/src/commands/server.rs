//! `server` command: run the tunnel server and the port lease service

use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use st_core::config::{self, ServerConfig};
use st_core::tunnel::FrpBackend;

use crate::output::print_error;

/// Load the server config, optionally moving the lease API to `api_port`
pub fn load_server_config(path: Option<&Path>, api_port: Option<u16>) -> Result<ServerConfig> {
    let mut server_config = match path {
        Some(path) => config::load_config::<ServerConfig>(path)
            .with_context(|| format!("Failed to load server config from {:?}", path))?,
        None => {
            let default_path = config::default_server_config_path();
            if default_path.exists() {
                config::load_config(&default_path).with_context(|| {
                    format!("Failed to load server config from {:?}", default_path)
                })?
            } else {
                ServerConfig::default()
            }
        }
    };

    if let Some(port) = api_port {
        server_config.lease.set_api_port(port);
    }

    Ok(server_config)
}

/// Run the server until a shutdown signal or a failure of either half
pub async fn server_command(server_config: ServerConfig, cancel: CancellationToken) -> Result<()> {
    let backend = FrpBackend::new(server_config.frp.clone());

    tracing::info!(
        "Lease service listening on {}",
        server_config.lease.api_bind_address
    );

    match st_server::run_server(server_config, &backend, cancel).await {
        Ok(()) => {
            tracing::info!("Server stopped");
            Ok(())
        }
        Err(e) => {
            let stage = e.stage();
            tracing::error!("Server failed during {}: {}", stage, e);
            print_error(&format!("{} failed: {}", stage, e));
            Err(e).with_context(|| format!("Server failed during {}", stage))
        }
    }
}
