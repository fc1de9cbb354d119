//! Agent configuration
//!
//! Field names follow the JSON agent config used by existing deployments:
//!
//! ```json
//! {
//!   "agent_id": "gpu-node-7",
//!   "local_ip": "127.0.0.1",
//!   "local_port": 22,
//!   "transport": { "protocol": "tcp", "bandwidth_limit_mode": "client" },
//!   "auth": { "method": "token", "token": "secret" },
//!   "server_addr": "tunnels.example.org",
//!   "server_port": 7000,
//!   "server_api": "http://tunnels.example.org:8000",
//!   "log": { "level": "info", "to": "console" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;
use super::{FrpConfig, LogConfig};
use crate::error::ConfigError;

/// Configuration for a tunnel agent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Agent identifier (blank means the host name)
    pub agent_id: String,

    /// Address of the local service to expose
    pub local_ip: String,

    /// Port of the local service to expose
    pub local_port: u16,

    /// Transport settings handed to the tunnel library
    pub transport: TransportSettings,

    /// Authentication against the tunnel server
    pub auth: AuthSettings,

    /// Tunnel server address
    pub server_addr: String,

    /// Tunnel server control port
    pub server_port: u16,

    /// Base URL of the lease service
    pub server_api: String,

    /// Timeout of the lease request
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,

    /// Logging settings
    pub log: LogConfig,

    /// frp binary settings
    pub frp: FrpConfig,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            agent_id: String::new(),
            local_ip: "127.0.0.1".to_string(),
            local_port: 22,
            transport: TransportSettings::default(),
            auth: AuthSettings::default(),
            server_addr: "127.0.0.1".to_string(),
            server_port: 7000,
            server_api: "http://127.0.0.1:8000".to_string(),
            request_timeout: Duration::from_secs(30),
            log: LogConfig::default(),
            frp: FrpConfig::default(),
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.local_port == 0 {
            return Err(ConfigError::Invalid("local_port must not be 0".to_string()));
        }
        if self.server_port == 0 {
            return Err(ConfigError::Invalid("server_port must not be 0".to_string()));
        }
        if self.server_addr.trim().is_empty() {
            return Err(ConfigError::MissingField("server_addr".to_string()));
        }
        if self.server_api.trim().is_empty() {
            return Err(ConfigError::MissingField("server_api".to_string()));
        }
        if self.local_ip.trim().is_empty() {
            return Err(ConfigError::MissingField("local_ip".to_string()));
        }
        Ok(())
    }
}

/// Transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Protocol between agent and tunnel server (tcp, kcp, quic, websocket, wss)
    pub protocol: String,

    /// Where bandwidth limits are enforced (client or server)
    pub bandwidth_limit_mode: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            protocol: "tcp".to_string(),
            bandwidth_limit_mode: "client".to_string(),
        }
    }
}

/// Authentication settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Authentication method (token or oidc)
    pub method: String,

    /// Shared token
    pub token: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            method: "token".to_string(),
            token: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{parse_config, ConfigFormat};

    #[test]
    fn test_legacy_json_config_loads() {
        let json = r#"{
            "agent_id": "gpu-node-7",
            "local_ip": "127.0.0.1",
            "local_port": 8888,
            "transport": { "bandwidth_limit_mode": "client", "protocol": "tcp" },
            "auth": { "method": "token", "token": "s3cret" },
            "server_addr": "tunnels.example.org",
            "server_port": 17000,
            "server_api": "http://tunnels.example.org:8000",
            "log": { "level": "debug", "to": "console" }
        }"#;

        let config: AgentConfig = parse_config(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.agent_id, "gpu-node-7");
        assert_eq!(config.local_port, 8888);
        assert_eq!(config.auth.token, "s3cret");
        assert_eq!(config.server_port, 17000);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_local_port() {
        let config = AgentConfig {
            local_port: 0,
            ..AgentConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_requires_server_api() {
        let config = AgentConfig {
            server_api: " ".to_string(),
            ..AgentConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));
    }
}
