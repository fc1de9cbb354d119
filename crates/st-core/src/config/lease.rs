//! Lease service configuration

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::time::Duration;

use super::serde_utils::{duration_millis, duration_secs};
use crate::error::{ConfigError, LeaseError};

/// Inclusive range of allocatable ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub const fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Reject empty ranges and ranges touching port 0
    pub fn validate(&self) -> Result<(), LeaseError> {
        if self.start == 0 || self.start > self.end {
            return Err(LeaseError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Ports in ascending order
    pub fn ports(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }

    pub fn contains(&self, port: u16) -> bool {
        self.ports().contains(&port)
    }

    /// Number of ports in the range
    pub fn len(&self) -> usize {
        if self.start > self.end {
            0
        } else {
            usize::from(self.end - self.start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::new(10000, 15000)
    }
}

/// Configuration for the port lease service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LeaseConfig {
    /// Address the HTTP lease API listens on
    pub api_bind_address: String,

    /// Ports handed out to agents
    pub port_range: PortRange,

    /// How long a reservation blocks its port (milliseconds)
    #[serde(with = "duration_millis")]
    pub lease_ttl: Duration,

    /// When false, leases never expire and ports are only recycled by a
    /// process restart. Use for long-lived tunnels.
    pub expiry_enabled: bool,

    /// Interval of the background sweep of expired leases (seconds, 0 = off)
    #[serde(with = "duration_secs")]
    pub sweep_interval: Duration,

    /// Host the availability probe binds on
    pub probe_host: String,
}

impl Default for LeaseConfig {
    fn default() -> Self {
        Self {
            api_bind_address: "0.0.0.0:8000".to_string(),
            port_range: PortRange::default(),
            lease_ttl: Duration::from_millis(60_000),
            expiry_enabled: true,
            sweep_interval: Duration::ZERO,
            probe_host: "127.0.0.1".to_string(),
        }
    }
}

impl LeaseConfig {
    /// TTL applied to leases, `None` when expiry is disabled
    pub fn effective_ttl(&self) -> Option<Duration> {
        self.expiry_enabled.then_some(self.lease_ttl)
    }

    /// Sweep interval, `None` when the sweep is disabled
    pub fn sweep(&self) -> Option<Duration> {
        (!self.sweep_interval.is_zero()).then_some(self.sweep_interval)
    }

    /// Replace the port of `api_bind_address`, keeping its host
    pub fn set_api_port(&mut self, port: u16) {
        let host = self
            .api_bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        self.api_bind_address = format!("{}:{}", host, port);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.port_range
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.expiry_enabled && self.lease_ttl.is_zero() {
            return Err(ConfigError::Invalid(
                "lease_ttl must be greater than zero".to_string(),
            ));
        }
        if self.api_bind_address.trim().is_empty() {
            return Err(ConfigError::MissingField("lease.api_bind_address".to_string()));
        }
        if self.probe_host.trim().is_empty() {
            return Err(ConfigError::MissingField("lease.probe_host".to_string()));
        }
        Ok(())
    }
}
