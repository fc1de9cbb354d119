//! CLI integration tests
//!
//! Tests the shuttle-tunnels CLI using assert_cmd.

use std::net::SocketAddr;
use std::sync::Arc;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use st_core::config::{LeaseConfig, PortRange};
use st_core::{ProbeError, SystemClock};
use st_server::{LeaseServer, PortAllocator, PortProber, ServerState};

fn shuttle_tunnels() -> Command {
    Command::cargo_bin("shuttle-tunnels")
        .expect("Failed to locate shuttle-tunnels binary - ensure it's built before running tests")
}

/// Prober that reports every port free, or every port busy
struct FixedProber {
    free: bool,
}

impl PortProber for FixedProber {
    fn probe(&self, port: u16) -> Result<(), ProbeError> {
        if self.free {
            Ok(())
        } else {
            Err(ProbeError::InUse { port })
        }
    }
}

async fn start_lease_service(range: PortRange, free: bool) -> (SocketAddr, CancellationToken) {
    let config = LeaseConfig {
        port_range: range,
        ..LeaseConfig::default()
    };
    let allocator = Arc::new(PortAllocator::with_parts(
        range,
        config.effective_ttl(),
        Arc::new(FixedProber { free }),
        Arc::new(SystemClock),
    ));
    let state = Arc::new(ServerState::with_allocator(config, allocator));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let server = LeaseServer::new(address.to_string(), state).with_shutdown_token(cancel.clone());
    tokio::spawn(async move { server.serve(listener).await });

    (address, cancel)
}

#[test]
fn test_cli_help() {
    shuttle_tunnels()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("shuttle-tunnels"))
        .stdout(predicate::str::contains(
            "Ephemeral port leasing and reverse tunnel orchestration",
        ));
}

#[test]
fn test_cli_version() {
    shuttle_tunnels()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("shuttle-tunnels"));
}

#[test]
fn test_cli_client_help() {
    shuttle_tunnels()
        .args(["client", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--server-api"));
}

#[test]
fn test_cli_server_help() {
    shuttle_tunnels()
        .args(["server", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("lease"));
}

#[test]
fn test_cli_requires_subcommand() {
    shuttle_tunnels().assert().failure();
}

#[test]
fn test_client_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("agent.json");

    shuttle_tunnels()
        .arg("client")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load agent config"));
}

#[test]
fn test_server_invalid_range_fails_in_configuration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("server.toml");
    std::fs::write(
        &path,
        "[lease]\napi_bind_address = \"127.0.0.1:0\"\n\n[lease.port_range]\nstart = 15000\nend = 10000\n",
    )
    .unwrap();

    shuttle_tunnels()
        .arg("server")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration failed"));
}

#[test]
fn test_server_rejects_native_frps_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("frps.toml");
    std::fs::write(&path, "bindPort = 7500\n\n[auth]\ntoken = \"s3cret\"\n").unwrap();

    shuttle_tunnels()
        .arg("server")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load server config"));
}

#[test]
fn test_config_init_and_show() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("server.toml");

    shuttle_tunnels()
        .args(["config", "init", "server"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    shuttle_tunnels()
        .args(["config", "show", "server"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("port_range"));

    shuttle_tunnels()
        .args(["config", "init", "server"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_reserve_unreachable_service_fails() {
    shuttle_tunnels()
        .args(["reserve", "http://127.0.0.1:1", "--timeout", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to reserve a port"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reserve_prints_leased_port() {
    let (address, shutdown) = start_lease_service(PortRange::new(31000, 31002), true).await;
    let server_api = format!("http://{}", address);

    let output = tokio::task::spawn_blocking(move || {
        shuttle_tunnels()
            .args(["-q", "reserve", &server_api, "--agent-id", "cli-test"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "31000");

    shutdown.cancel();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_exhausted_service_fails_in_lease_acquisition() {
    let (address, shutdown) = start_lease_service(PortRange::new(31000, 31002), false).await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("agent.json");
    std::fs::write(
        &path,
        format!(
            r#"{{"agent_id": "cli-test", "local_port": 8888, "server_api": "http://{}"}}"#,
            address
        ),
    )
    .unwrap();

    let output = tokio::task::spawn_blocking(move || {
        shuttle_tunnels().arg("client").arg(&path).output().unwrap()
    })
    .await
    .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("lease acquisition failed"));

    shutdown.cancel();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_missing_tunnel_binary_fails_in_tunnel_startup() {
    let (address, shutdown) = start_lease_service(PortRange::new(31000, 31002), true).await;
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("agent.toml");
    std::fs::write(
        &path,
        format!(
            "agent_id = \"cli-test\"\nserver_api = \"http://{}\"\n\n[frp]\nfrpc_path = \"{}\"\nwork_dir = \"{}\"\n",
            address,
            dir.path().join("no-such-frpc").display(),
            dir.path().display()
        ),
    )
    .unwrap();

    let output = tokio::task::spawn_blocking(move || {
        shuttle_tunnels().arg("client").arg(&path).output().unwrap()
    })
    .await
    .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("tunnel startup failed"));

    shutdown.cancel();
}
