//! frp backend
//!
//! Renders frp's TOML configuration for the requested tunnel and runs the
//! `frpc` / `frps` binary against it. The child process is killed when the
//! cancellation token fires or the future is dropped.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use super::{ClientTunnelSpec, ServerTunnelSpec, TunnelBackend, TCP_PROXY};
use crate::config::FrpConfig;
use crate::error::TunnelError;

/// Runs tunnels through the frp binaries
#[derive(Debug, Clone)]
pub struct FrpBackend {
    config: FrpConfig,
}

impl FrpBackend {
    pub fn new(config: FrpConfig) -> Self {
        Self { config }
    }

    /// Render `frpc.toml` for a client spec
    pub fn render_client_config(spec: &ClientTunnelSpec) -> Result<String, TunnelError> {
        let file = FrpcFile {
            server_addr: &spec.server_addr,
            server_port: spec.server_port,
            auth: FrpAuth::new(&spec.auth_method, &spec.auth_token),
            transport: FrpcTransport {
                protocol: &spec.protocol,
            },
            log: FrpLog {
                to: &spec.log_to,
                level: &spec.log_level,
            },
            proxies: vec![FrpProxy {
                name: &spec.name,
                proxy_type: TCP_PROXY,
                local_ip: &spec.local_ip,
                local_port: spec.local_port,
                remote_port: spec.remote_port,
                transport: FrpProxyTransport {
                    bandwidth_limit_mode: &spec.bandwidth_limit_mode,
                },
            }],
        };
        Ok(toml::to_string(&file)?)
    }

    /// Render `frps.toml` for a server spec
    pub fn render_server_config(spec: &ServerTunnelSpec) -> Result<String, TunnelError> {
        let file = FrpsFile {
            bind_addr: &spec.bind_addr,
            bind_port: spec.bind_port,
            auth: FrpAuth::new(&spec.auth_method, &spec.auth_token),
            log: FrpLog {
                to: &spec.log_to,
                level: &spec.log_level,
            },
            allow_ports: vec![FrpPortRange {
                start: spec.allow_ports.start,
                end: spec.allow_ports.end,
            }],
        };
        Ok(toml::to_string(&file)?)
    }

    /// Write a generated config into the work directory
    ///
    /// The file carries the auth token, so it is only readable by the owner.
    async fn write_config(&self, file_name: &str, content: &str) -> Result<PathBuf, TunnelError> {
        let dir = self.config.work_dir();
        tokio::fs::create_dir_all(&dir).await?;

        let path = dir.join(file_name);
        tokio::fs::write(&path, content).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&path, permissions).await?;
        }

        Ok(path)
    }

    /// Run `program -c config_path` until it exits or `cancel` fires
    async fn run_process(
        program: &Path,
        config_path: &Path,
        cancel: CancellationToken,
    ) -> Result<(), TunnelError> {
        let program_name = program.display().to_string();

        let mut child = Command::new(program)
            .arg("-c")
            .arg(config_path)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TunnelError::Spawn {
                program: program_name.clone(),
                source,
            })?;

        tracing::info!(
            "Started {} (pid {:?}) with {}",
            program_name,
            child.id(),
            config_path.display()
        );

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                if status.success() {
                    tracing::info!("{} exited", program_name);
                    Ok(())
                } else {
                    Err(TunnelError::Exited {
                        program: program_name,
                        status: status.to_string(),
                    })
                }
            }
            _ = cancel.cancelled() => {
                tracing::info!("Stopping {}", program_name);
                child.kill().await?;
                Ok(())
            }
        }
    }
}

#[async_trait]
impl TunnelBackend for FrpBackend {
    async fn run_client(
        &self,
        spec: ClientTunnelSpec,
        cancel: CancellationToken,
    ) -> Result<(), TunnelError> {
        let content = Self::render_client_config(&spec)?;
        let path = self
            .write_config(&format!("frpc-{}.toml", file_stem(&spec.name)), &content)
            .await?;
        Self::run_process(&self.config.frpc_path, &path, cancel).await
    }

    async fn run_server(
        &self,
        spec: ServerTunnelSpec,
        cancel: CancellationToken,
    ) -> Result<(), TunnelError> {
        spec.allow_ports
            .validate()
            .map_err(|e| TunnelError::InvalidConfig(e.to_string()))?;
        let content = Self::render_server_config(&spec)?;
        let path = self.write_config("frps.toml", &content).await?;
        Self::run_process(&self.config.frps_path, &path, cancel).await
    }
}

/// Keep proxy names usable as file names
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "agent".to_string()
    } else {
        stem
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrpcFile<'a> {
    server_addr: &'a str,
    server_port: u16,
    auth: FrpAuth<'a>,
    transport: FrpcTransport<'a>,
    log: FrpLog<'a>,
    proxies: Vec<FrpProxy<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrpsFile<'a> {
    bind_addr: &'a str,
    bind_port: u16,
    auth: FrpAuth<'a>,
    log: FrpLog<'a>,
    allow_ports: Vec<FrpPortRange>,
}

#[derive(Serialize)]
struct FrpAuth<'a> {
    method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<&'a str>,
}

impl<'a> FrpAuth<'a> {
    fn new(method: &'a str, token: &'a str) -> Self {
        Self {
            method,
            token: (!token.is_empty()).then_some(token),
        }
    }
}

#[derive(Serialize)]
struct FrpcTransport<'a> {
    protocol: &'a str,
}

#[derive(Serialize)]
struct FrpLog<'a> {
    to: &'a str,
    level: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrpProxy<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    proxy_type: &'a str,
    #[serde(rename = "localIP")]
    local_ip: &'a str,
    local_port: u16,
    remote_port: u16,
    transport: FrpProxyTransport<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FrpProxyTransport<'a> {
    bandwidth_limit_mode: &'a str,
}

#[derive(Serialize)]
struct FrpPortRange {
    start: u16,
    end: u16,
}
