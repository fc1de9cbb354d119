//! Server configuration

use serde::{Deserialize, Serialize};

use super::{AuthSettings, FrpConfig, LeaseConfig, LogConfig};
use crate::error::ConfigError;

/// Configuration for the tunnel server and its lease service
///
/// Unknown keys are rejected, so a native frps config handed to the server
/// fails to load instead of silently falling back to defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Tunnel server settings handed to the tunnel library
    pub tunnel: TunnelServerSettings,

    /// Port lease service
    pub lease: LeaseConfig,

    /// Logging settings
    pub log: LogConfig,

    /// frp binary settings
    pub frp: FrpConfig,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tunnel.validate()?;
        self.lease.validate()
    }
}

/// Settings of the tunnel server agents connect to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TunnelServerSettings {
    /// Address the tunnel server binds to
    pub bind_addr: String,

    /// Control port agents connect to
    pub bind_port: u16,

    /// Authentication required from agents
    pub auth: AuthSettings,
}

impl Default for TunnelServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            bind_port: 7000,
            auth: AuthSettings::default(),
        }
    }
}

impl TunnelServerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_port == 0 {
            return Err(ConfigError::Invalid(
                "tunnel.bind_port must not be 0".to_string(),
            ));
        }
        if self.bind_addr.trim().is_empty() {
            return Err(ConfigError::MissingField("tunnel.bind_addr".to_string()));
        }
        Ok(())
    }
}
