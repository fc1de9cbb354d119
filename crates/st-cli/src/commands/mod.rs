//! CLI command implementations

mod client;
mod config;
mod reserve;
mod server;

pub use client::{client_command, load_agent_config, ClientOverrides};
pub use config::{config_init, config_path, config_show, ConfigKind};
pub use reserve::reserve_command;
pub use server::{load_server_config, server_command};
