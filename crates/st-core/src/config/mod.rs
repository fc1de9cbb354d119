//! Configuration management for shuttle-tunnels
//!
//! Config files are TOML or JSON, picked by file extension. JSON keeps the
//! field names of the legacy agent config so existing files load unchanged.

mod agent;
mod lease;
mod log;
mod server;
pub mod serde_utils;

pub use agent::{AgentConfig, AuthSettings, TransportSettings};
pub use lease::{LeaseConfig, PortRange};
pub use log::{FrpConfig, LogConfig};
pub use server::{ServerConfig, TunnelServerSettings};

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Get the default configuration directory
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shuttle-tunnels")
}

/// Get the default agent configuration file path
pub fn default_agent_config_path() -> PathBuf {
    default_config_dir().join("agent.toml")
}

/// Get the default server configuration file path
pub fn default_server_config_path() -> PathBuf {
    default_config_dir().join("server.toml")
}

/// On-disk format of a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON, everything else is TOML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

/// Load configuration from a file
pub fn load_config<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("Failed to read config: {}", e)))?;

    parse_config(&content, ConfigFormat::from_path(path))
}

/// Parse configuration text in the given format
pub fn parse_config<T: serde::de::DeserializeOwned>(
    content: &str,
    format: ConfigFormat,
) -> Result<T, ConfigError> {
    let config = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };
    Ok(config)
}

/// Render configuration in the given format
pub fn render_config<T: serde::Serialize>(
    config: &T,
    format: ConfigFormat,
) -> Result<String, ConfigError> {
    let content = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
    };
    Ok(content)
}

/// Save configuration to a file
pub fn save_config<T: serde::Serialize>(path: &Path, config: &T) -> Result<(), ConfigError> {
    let content = render_config(config, ConfigFormat::from_path(path))?;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| ConfigError::Invalid(format!("Failed to create config dir: {}", e)))?;
    }

    std::fs::write(path, content)
        .map_err(|e| ConfigError::Invalid(format!("Failed to write config: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("a.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.JSON")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Toml);
    }

    #[test]
    fn test_load_missing_file() {
        let result: Result<ServerConfig, _> = load_config(Path::new("/nonexistent/server.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_save_and_load_server_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("server.toml");

        let mut config = ServerConfig::default();
        config.lease.port_range = PortRange::new(20000, 20010);
        save_config(&path, &config).unwrap();

        let loaded: ServerConfig = load_config(&path).unwrap();
        assert_eq!(loaded.lease.port_range, PortRange::new(20000, 20010));
        assert_eq!(loaded.lease.lease_ttl, config.lease.lease_ttl);
    }

    #[test]
    fn test_save_and_load_agent_config_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agent.json");

        let mut config = AgentConfig::default();
        config.agent_id = "agent-42".to_string();
        config.local_port = 8888;
        save_config(&path, &config).unwrap();

        let loaded: AgentConfig = load_config(&path).unwrap();
        assert_eq!(loaded.agent_id, "agent-42");
        assert_eq!(loaded.local_port, 8888);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let result: Result<ServerConfig, _> = parse_config("lease = [", ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
