//! Logging and external binary settings shared by agent and server configs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,

    /// `"console"` or a file path to append to
    pub to: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            to: "console".to_string(),
        }
    }
}

impl LogConfig {
    /// File to log to, `None` for the console
    pub fn file(&self) -> Option<PathBuf> {
        let to = self.to.trim();
        if to.is_empty() || to.eq_ignore_ascii_case("console") {
            None
        } else {
            Some(PathBuf::from(to))
        }
    }
}

/// Location of the frp binaries and their generated configs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrpConfig {
    /// Path or name of the `frpc` binary
    pub frpc_path: PathBuf,

    /// Path or name of the `frps` binary
    pub frps_path: PathBuf,

    /// Directory generated frp configs are written to
    pub work_dir: Option<PathBuf>,
}

impl Default for FrpConfig {
    fn default() -> Self {
        Self {
            frpc_path: PathBuf::from("frpc"),
            frps_path: PathBuf::from("frps"),
            work_dir: None,
        }
    }
}

impl FrpConfig {
    /// Work directory, defaulting to `<config dir>/run`
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir
            .clone()
            .unwrap_or_else(|| super::default_config_dir().join("run"))
    }
}
