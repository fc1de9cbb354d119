//! Lease API handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;

use st_core::LeaseError;
use st_protocol::{LeaseInfo, ReservePortRequest, ReservePortResponse};

use crate::state::ServerState;

/// Reserve a port for the requesting agent
///
/// The body is decoded by hand so that any undecodable body, whatever its
/// content type, is answered with 400.
pub async fn reserve_port(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    let request: ReservePortRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected reserve_port request: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid request").into_response();
        }
    };

    tracing::debug!("Port reservation requested by agent {:?}", request.agent_id);

    let allocator = Arc::clone(state.allocator());
    let agent_id = request.agent_id;
    let result = tokio::task::spawn_blocking(move || allocator.allocate(&agent_id)).await;

    match result {
        Ok(Ok(port)) => Json(ReservePortResponse::reserved(port)).into_response(),
        Ok(Err(e @ LeaseError::NoFreePort { .. })) => {
            tracing::warn!("Port reservation failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "No free ports available").into_response()
        }
        Ok(Err(e @ LeaseError::InvalidRange { .. })) => {
            tracing::error!("Port reservation failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Invalid port range").into_response()
        }
        Err(e) => {
            tracing::error!("Allocator task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// List live leases
///
/// Reading the table waits for any running scan, so it happens on a
/// blocking thread like allocation does.
pub async fn list_leases(State(state): State<Arc<ServerState>>) -> Response {
    let allocator = Arc::clone(state.allocator());
    let result = tokio::task::spawn_blocking(move || {
        let ttl = allocator.ttl();
        allocator
            .live_leases()
            .iter()
            .map(|lease| lease.to_info(ttl))
            .collect::<Vec<LeaseInfo>>()
    })
    .await;

    match result {
        Ok(leases) => Json(leases).into_response(),
        Err(e) => {
            tracing::error!("Lease listing task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Liveness probe
pub async fn health() -> &'static str {
    "ok"
}
