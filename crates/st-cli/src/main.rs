//! shuttle-tunnels CLI
//!
//! Single binary for all shuttle-tunnels operations:
//! - Server (tunnel server plus the port lease service)
//! - Client (agent that leases a remote port and opens a reverse tunnel)
//! - Operational helpers (reserve, config)

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

use shuttle_tunnels::commands::{self, ClientOverrides, ConfigKind};
use shuttle_tunnels::logging::init_logging;
use shuttle_tunnels::signal::cancel_on_shutdown_signal;
use st_core::config::LogConfig;

#[derive(Parser)]
#[command(name = "shuttle-tunnels")]
#[command(author, version, about = "Ephemeral port leasing and reverse tunnel orchestration")]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lease a remote port and run the tunnel client (agent)
    /// Alias: agent
    #[command(alias = "agent")]
    Client {
        /// Agent config file (TOML, or JSON by extension)
        config: Option<PathBuf>,
        /// Agent identifier presented to the lease service
        #[arg(long, env = "SHUTTLE_AGENT_ID")]
        agent_id: Option<String>,
        /// Base URL of the lease service
        #[arg(long)]
        server_api: Option<String>,
    },

    /// Run the tunnel server and the port lease service
    Server {
        /// Server config file (TOML, or JSON by extension)
        config: Option<PathBuf>,
        /// Port of the lease API (overrides config)
        api_port: Option<u16>,
    },

    /// Reserve one port from a lease service and print it
    Reserve {
        /// Base URL of the lease service
        server_api: String,
        /// Agent identifier recorded with the lease (defaults to host name)
        #[arg(long)]
        agent_id: Option<String>,
        /// Request timeout in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file
    Init {
        /// Which config to create
        #[arg(value_enum)]
        kind: ConfigKind,
        /// Target file (defaults to the config directory)
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Show the effective configuration
    Show {
        #[arg(value_enum)]
        kind: ConfigKind,
        path: Option<PathBuf>,
    },
    /// Show config directory and default file paths
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Client {
            config,
            agent_id,
            server_api,
        } => {
            let overrides = ClientOverrides {
                agent_id,
                server_api,
            };
            let agent_config = commands::load_agent_config(config.as_deref(), &overrides)?;
            init_logging(&agent_config.log, cli.verbose, cli.quiet)?;

            let cancel = CancellationToken::new();
            cancel_on_shutdown_signal(cancel.clone());
            commands::client_command(agent_config, cancel).await
        }

        Commands::Server { config, api_port } => {
            let server_config = commands::load_server_config(config.as_deref(), api_port)?;
            init_logging(&server_config.log, cli.verbose, cli.quiet)?;

            let cancel = CancellationToken::new();
            cancel_on_shutdown_signal(cancel.clone());
            commands::server_command(server_config, cancel).await
        }

        Commands::Reserve {
            server_api,
            agent_id,
            timeout,
        } => {
            init_logging(&LogConfig::default(), cli.verbose, cli.quiet)?;
            let port = commands::reserve_command(
                &server_api,
                agent_id.as_deref(),
                Duration::from_secs(timeout),
            )
            .await?;
            println!("{}", port);
            Ok(())
        }

        Commands::Config { action } => {
            init_logging(&LogConfig::default(), cli.verbose, cli.quiet)?;
            match action {
                ConfigAction::Init { kind, path, force } => {
                    commands::config_init(kind, path.as_deref(), force)
                        .context("Failed to initialize configuration")?;
                }
                ConfigAction::Show { kind, path } => {
                    commands::config_show(kind, path.as_deref())
                        .context("Failed to show configuration")?;
                }
                ConfigAction::Path => commands::config_path(),
            }
            Ok(())
        }
    }
}
