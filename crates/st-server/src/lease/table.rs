//! In-memory lease table

use std::collections::HashMap;
use std::time::Duration;

use st_core::time::elapsed_millis;
use st_protocol::LeaseInfo;

/// A reservation of one port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    pub port: u16,
    /// Agent that asked for the port (diagnostics only)
    pub agent_id: String,
    /// Milliseconds since the Unix epoch
    pub reserved_at: u64,
}

impl Lease {
    pub fn new(port: u16, agent_id: impl Into<String>, reserved_at: u64) -> Self {
        Self {
            port,
            agent_id: agent_id.into(),
            reserved_at,
        }
    }

    /// A lease is live while `now - reserved_at < ttl`; without a TTL it
    /// never expires.
    pub fn is_live(&self, now: u64, ttl: Option<Duration>) -> bool {
        match ttl {
            Some(ttl) => elapsed_millis(self.reserved_at, now) < ttl.as_millis() as u64,
            None => true,
        }
    }

    /// Timestamp at which the lease stops being live
    pub fn expires_at(&self, ttl: Option<Duration>) -> Option<u64> {
        ttl.map(|ttl| self.reserved_at.saturating_add(ttl.as_millis() as u64))
    }

    pub fn to_info(&self, ttl: Option<Duration>) -> LeaseInfo {
        LeaseInfo {
            port: self.port,
            agent_id: self.agent_id.clone(),
            reserved_at: self.reserved_at,
            expires_at: self.expires_at(ttl),
        }
    }
}

/// Leases keyed by port
///
/// Not synchronized; the allocator owns it behind a single lock.
#[derive(Debug, Default)]
pub struct LeaseTable {
    leases: HashMap<u16, Lease>,
}

impl LeaseTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, port: u16) -> Option<&Lease> {
        self.leases.get(&port)
    }

    /// Insert a lease, replacing any previous lease on the same port
    pub fn insert(&mut self, lease: Lease) -> Option<Lease> {
        self.leases.insert(lease.port, lease)
    }

    pub fn remove(&mut self, port: u16) -> Option<Lease> {
        self.leases.remove(&port)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lease> {
        self.leases.values()
    }

    /// Drop every expired lease, returning how many were removed
    pub fn remove_expired(&mut self, now: u64, ttl: Option<Duration>) -> usize {
        let before = self.leases.len();
        self.leases.retain(|_, lease| lease.is_live(now, ttl));
        before - self.leases.len()
    }

    pub fn len(&self) -> usize {
        self.leases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leases.is_empty()
    }
}
