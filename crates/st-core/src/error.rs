//! Core error types for shuttle-tunnels

use std::path::PathBuf;
use thiserror::Error;

/// Error type of the configuration file operations
#[derive(Error, Debug)]
pub enum ShuttleError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Port allocation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaseError {
    /// Every port in the range is leased or bound by another process
    #[error("No free ports available in the range {start}-{end}")]
    NoFreePort { start: u16, end: u16 },

    /// Range is empty or starts at port 0
    #[error("Invalid port range {start}-{end}")]
    InvalidRange { start: u16, end: u16 },
}

/// Reasons a port failed the availability probe
///
/// The allocator treats every variant as "unavailable"; the distinction
/// only feeds the logs.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// Another socket holds the port
    #[error("Port {port} is in use")]
    InUse { port: u16 },

    /// Binding requires privileges we do not have
    #[error("Permission denied binding port {port}")]
    PermissionDenied { port: u16 },

    /// Any other bind failure
    #[error("Failed to bind port {port}: {source}")]
    Other {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    /// Classify a bind error for `port`
    pub fn from_io(port: u16, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::AddrInUse => ProbeError::InUse { port },
            std::io::ErrorKind::PermissionDenied => ProbeError::PermissionDenied { port },
            _ => ProbeError::Other { port, source: err },
        }
    }
}

/// Errors surfaced by the external tunneling library
#[derive(Error, Debug)]
pub enum TunnelError {
    /// The tunnel process could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The tunnel process exited unsuccessfully
    #[error("{program} exited with {status}")]
    Exited { program: String, status: String },

    /// The library configuration could not be rendered
    #[error("Failed to render tunnel config: {0}")]
    Render(#[from] toml::ser::Error),

    /// Invalid tunnel configuration
    #[error("Invalid tunnel config: {0}")]
    InvalidConfig(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file not found
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// Invalid configuration
    #[error("Invalid config: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// JSON parse or serialize error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),
}
