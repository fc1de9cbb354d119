//! HTTP client for the lease service

use std::time::Duration;

use thiserror::Error;

use st_core::AgentId;
use st_protocol::{ReservePortRequest, ReservePortResponse, RESERVE_PORT_PATH};

/// Lease request failures
#[derive(Debug, Error)]
pub enum LeaseClientError {
    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request did not complete
    #[error("Lease request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-200 status
    #[error("Lease service responded {status}: {body}")]
    Status { status: u16, body: String },

    /// The 200 body was not a reservation
    #[error("Failed to decode lease response: {0}")]
    Decode(#[source] reqwest::Error),

    /// The service declined the reservation
    #[error("Lease service rejected the reservation: {0}")]
    Rejected(String),
}

/// Client for `POST /reserve_port`
#[derive(Debug, Clone)]
pub struct LeaseClient {
    base_url: String,
    http: reqwest::Client,
}

impl LeaseClient {
    /// Create a client for the lease service at `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LeaseClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LeaseClientError::Client)?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL of the lease service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Reserve a remote port for `agent_id`
    pub async fn reserve_port(
        &self,
        agent_id: &AgentId,
    ) -> Result<ReservePortResponse, LeaseClientError> {
        let url = format!("{}{}", self.base_url, RESERVE_PORT_PATH);
        tracing::debug!("Requesting port lease from {}", url);

        let response = self
            .http
            .post(&url)
            .json(&ReservePortRequest::new(agent_id.as_str()))
            .send()
            .await
            .map_err(|source| LeaseClientError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(LeaseClientError::Status {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let reservation: ReservePortResponse =
            response.json().await.map_err(LeaseClientError::Decode)?;
        if !reservation.success {
            return Err(LeaseClientError::Rejected(reservation.message));
        }

        Ok(reservation)
    }
}
