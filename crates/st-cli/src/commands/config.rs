//! Config command implementations

use std::path::{Path, PathBuf};

use clap::ValueEnum;

use st_core::config::{self, AgentConfig, ConfigFormat, ServerConfig};
use st_core::{ConfigError, ShuttleError};

use crate::output::{print_info, print_success, print_warning};

/// Which side a config file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigKind {
    /// Tunnel agent (`client` command)
    Agent,
    /// Tunnel server and lease service (`server` command)
    Server,
}

impl ConfigKind {
    /// Default location of this kind of config
    pub fn default_path(self) -> PathBuf {
        match self {
            ConfigKind::Agent => config::default_agent_config_path(),
            ConfigKind::Server => config::default_server_config_path(),
        }
    }

    fn save_default(self, path: &Path) -> Result<(), ConfigError> {
        match self {
            ConfigKind::Agent => config::save_config(path, &AgentConfig::default()),
            ConfigKind::Server => config::save_config(path, &ServerConfig::default()),
        }
    }

    /// Load and validate a config file, then render it back
    fn render_file(self, path: &Path) -> Result<String, ConfigError> {
        let format = ConfigFormat::from_path(path);
        match self {
            ConfigKind::Agent => {
                let loaded: AgentConfig = config::load_config(path)?;
                loaded.validate()?;
                config::render_config(&loaded, format)
            }
            ConfigKind::Server => {
                let loaded: ServerConfig = config::load_config(path)?;
                loaded.validate()?;
                config::render_config(&loaded, format)
            }
        }
    }
}

/// Write a default config, refusing to overwrite unless `force` is set
///
/// The file may hold an auth token, so it is readable by the owner only.
pub fn config_init(
    kind: ConfigKind,
    path: Option<&Path>,
    force: bool,
) -> Result<PathBuf, ShuttleError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(|| kind.default_path());

    if path.exists() && !force {
        return Err(ConfigError::Invalid(format!(
            "Config file already exists: {:?} (use --force to overwrite)",
            path
        ))
        .into());
    }

    kind.save_default(&path)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
    }

    print_success(&format!("Created configuration file: {:?}", path));
    Ok(path)
}

/// Print the effective config, with defaults filled in
pub fn config_show(kind: ConfigKind, path: Option<&Path>) -> Result<(), ShuttleError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(|| kind.default_path());

    if !path.exists() {
        print_warning(&format!("No configuration file found at {:?}", path));
        print_info("Run 'shuttle-tunnels config init' to create one");
        return Err(ConfigError::NotFound(path).into());
    }

    print_info(&format!("Configuration file: {:?}", path));
    println!("{}", kind.render_file(&path)?);
    Ok(())
}

/// Print the default config locations
pub fn config_path() {
    println!("{}", config::default_config_dir().display());
    println!("{}", ConfigKind::Agent.default_path().display());
    println!("{}", ConfigKind::Server.default_path().display());
}
