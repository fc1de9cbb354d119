//! Request and response bodies for the lease API
//!
//! # Message Flow
//!
//! 1. Agent sends `ReservePortRequest` to `POST /reserve_port`
//! 2. Service replies with `ReservePortResponse` (HTTP 200) carrying the port
//! 3. Decode failures and range exhaustion are reported as plain-text
//!    HTTP 400 / 500 bodies, never as JSON

use serde::{Deserialize, Serialize};

/// Message returned with every successful reservation.
pub const RESERVED_MESSAGE: &str = "Port reserved successfully";

/// Body of `POST /reserve_port`
///
/// The agent id is diagnostic only. Two calls with the same id receive two
/// different ports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservePortRequest {
    /// Identifier of the requesting agent
    #[serde(default)]
    pub agent_id: String,
}

impl ReservePortRequest {
    /// Create a new request for the given agent
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
        }
    }
}

/// Successful reply to `POST /reserve_port`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservePortResponse {
    /// Port leased on the tunnel server
    pub port: u16,
    /// Always true for HTTP 200 replies
    pub success: bool,
    /// Human-readable confirmation
    pub message: String,
}

impl ReservePortResponse {
    /// Build the reply for a freshly leased port
    pub fn reserved(port: u16) -> Self {
        Self {
            port,
            success: true,
            message: RESERVED_MESSAGE.to_string(),
        }
    }
}

/// One live lease, as reported by `GET /leases`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseInfo {
    pub port: u16,
    pub agent_id: String,
    /// Milliseconds since the Unix epoch
    pub reserved_at: u64,
    /// `None` when lease expiry is disabled
    pub expires_at: Option<u64>,
}
