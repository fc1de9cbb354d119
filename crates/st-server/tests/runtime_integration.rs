//! Server runtime tests with an in-process tunnel backend

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use st_core::config::{PortRange, ServerConfig};
use st_core::tunnel::{ClientTunnelSpec, ServerTunnelSpec, TunnelBackend};
use st_core::TunnelError;
use st_protocol::ReservePortResponse;
use st_server::{serve_with_listener, ServerError};

/// How the recording backend's tunnel server ends
#[derive(Default, Clone, Copy, PartialEq, Eq)]
enum Ending {
    /// Runs until cancelled
    #[default]
    Cancelled,
    /// Fails right away
    Fails,
    /// Exits cleanly right away
    Exits,
}

/// Backend that records the server spec and ends as configured
#[derive(Default)]
struct RecordingBackend {
    server_specs: Mutex<Vec<ServerTunnelSpec>>,
    ending: Ending,
}

#[async_trait]
impl TunnelBackend for RecordingBackend {
    async fn run_client(
        &self,
        _spec: ClientTunnelSpec,
        _cancel: CancellationToken,
    ) -> Result<(), TunnelError> {
        unreachable!("server runtime never starts clients")
    }

    async fn run_server(
        &self,
        spec: ServerTunnelSpec,
        cancel: CancellationToken,
    ) -> Result<(), TunnelError> {
        self.server_specs.lock().unwrap().push(spec);
        match self.ending {
            Ending::Cancelled => {
                cancel.cancelled().await;
                Ok(())
            }
            Ending::Fails => Err(TunnelError::Exited {
                program: "frps".to_string(),
                status: "exit status: 1".to_string(),
            }),
            Ending::Exits => Ok(()),
        }
    }
}

fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.lease.port_range = PortRange::new(43000, 43050);
    config.lease.sweep_interval = Duration::from_secs(5);
    config
}

#[tokio::test]
async fn test_server_serves_leases_until_cancelled() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let backend = Arc::new(RecordingBackend::default());
    let cancel = CancellationToken::new();

    let runtime = {
        let backend = Arc::clone(&backend);
        let cancel = cancel.clone();
        tokio::spawn(async move {
            serve_with_listener(test_config(), listener, backend.as_ref(), cancel).await
        })
    };

    let response = reqwest::Client::new()
        .post(format!("http://{}/reserve_port", address))
        .json(&serde_json::json!({ "agent_id": "agent-1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let reserved: ReservePortResponse = response.json().await.unwrap();
    assert!(PortRange::new(43000, 43050).contains(reserved.port));

    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(5), runtime)
        .await
        .expect("server did not shut down")
        .unwrap();
    assert!(result.is_ok());

    let specs = backend.server_specs.lock().unwrap();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].allow_ports, PortRange::new(43000, 43050));
}

#[tokio::test]
async fn test_tunnel_failure_stops_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let backend = RecordingBackend {
        ending: Ending::Fails,
        ..RecordingBackend::default()
    };

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        serve_with_listener(test_config(), listener, &backend, CancellationToken::new()),
    )
    .await
    .expect("server did not stop after tunnel failure");

    let err = result.unwrap_err();
    assert!(matches!(err, ServerError::Tunnel(TunnelError::Exited { .. })));
    assert_eq!(err.stage(), "tunnel server");

    // The lease API went down with the tunnel server
    let reachable = reqwest::Client::new()
        .get(format!("http://{}/health", address))
        .timeout(Duration::from_secs(1))
        .send()
        .await;
    assert!(reachable.is_err());
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_serving() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend = RecordingBackend::default();
    let mut config = test_config();
    config.lease.port_range = PortRange::new(43050, 43000);

    let result =
        serve_with_listener(config, listener, &backend, CancellationToken::new()).await;

    assert!(matches!(result, Err(ServerError::Config(_))));
    assert!(backend.server_specs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_clean_tunnel_exit_without_shutdown_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend = RecordingBackend {
        ending: Ending::Exits,
        ..RecordingBackend::default()
    };

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        serve_with_listener(test_config(), listener, &backend, CancellationToken::new()),
    )
    .await
    .expect("server did not stop after the tunnel server exited");

    let err = result.unwrap_err();
    assert!(matches!(err, ServerError::TunnelStopped));
    assert_eq!(err.stage(), "tunnel server");
}
