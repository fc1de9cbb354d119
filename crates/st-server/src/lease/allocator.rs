//! Port allocator
//!
//! Scans the configured range in ascending order and hands out the first
//! port that has no live lease and passes the availability probe.
//!
//! # Locking
//!
//! The lease table sits behind one mutex that is held for the whole
//! scan-and-insert, probes included. Two concurrent callers therefore can
//! never both see a port as free and both lease it. Probes are short local
//! binds; callers on an async runtime should still run [`PortAllocator::allocate`]
//! on a blocking thread.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use st_core::config::{LeaseConfig, PortRange};
use st_core::{Clock, LeaseError, SystemClock};

use super::prober::{PortProber, TcpProber};
use super::table::{Lease, LeaseTable};

/// Hands out non-conflicting ports from a range
#[derive(Clone)]
pub struct PortAllocator {
    range: PortRange,
    ttl: Option<Duration>,
    table: Arc<Mutex<LeaseTable>>,
    prober: Arc<dyn PortProber>,
    clock: Arc<dyn Clock>,
}

impl PortAllocator {
    /// Create an allocator from the lease configuration, probing with TCP
    /// binds on `probe_host` and reading the wall clock
    pub fn new(config: &LeaseConfig) -> Self {
        Self::with_parts(
            config.port_range,
            config.effective_ttl(),
            Arc::new(TcpProber::new(config.probe_host.clone())),
            Arc::new(SystemClock),
        )
    }

    /// Create an allocator from explicit parts. A `ttl` of `None` disables
    /// expiry.
    pub fn with_parts(
        range: PortRange,
        ttl: Option<Duration>,
        prober: Arc<dyn PortProber>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            range,
            ttl,
            table: Arc::new(Mutex::new(LeaseTable::new())),
            prober,
            clock,
        }
    }

    /// Configured port range
    pub fn range(&self) -> PortRange {
        self.range
    }

    /// Lease TTL, `None` when expiry is disabled
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Lease a port from the configured range
    pub fn allocate(&self, agent_id: &str) -> Result<u16, LeaseError> {
        self.allocate_in(self.range, agent_id)
    }

    /// Lease a port from `range`
    ///
    /// For each port, ascending:
    /// - a live lease skips the port
    /// - an expired lease is dropped and the port is probed
    /// - a port failing the probe is skipped without recording anything
    /// - the first port passing the probe is leased and returned
    pub fn allocate_in(&self, range: PortRange, agent_id: &str) -> Result<u16, LeaseError> {
        range.validate()?;

        let mut table = self.lock_table();
        let now = self.clock.now_millis();

        for port in range.ports() {
            if let Some(lease) = table.get(port) {
                if lease.is_live(now, self.ttl) {
                    tracing::trace!("Port {} is already reserved by {}", port, lease.agent_id);
                    continue;
                }
                tracing::debug!(
                    "Lease on port {} (agent {}) expired, reclaiming",
                    port,
                    lease.agent_id
                );
                table.remove(port);
            }

            match self.prober.probe(port) {
                Ok(()) => {
                    table.insert(Lease::new(port, agent_id, now));
                    tracing::info!("Reserved port {} for agent {}", port, agent_id);
                    return Ok(port);
                }
                Err(e) => {
                    tracing::debug!("Port {} is not available: {}", port, e);
                }
            }
        }

        tracing::warn!(
            "No free ports in {}-{} for agent {}",
            range.start,
            range.end,
            agent_id
        );
        Err(LeaseError::NoFreePort {
            start: range.start,
            end: range.end,
        })
    }

    /// Current lease on `port`, live or not
    pub fn lease(&self, port: u16) -> Option<Lease> {
        self.lock_table().get(port).cloned()
    }

    /// Live leases, sorted by port
    pub fn live_leases(&self) -> Vec<Lease> {
        let table = self.lock_table();
        let now = self.clock.now_millis();
        let mut leases: Vec<Lease> = table
            .iter()
            .filter(|lease| lease.is_live(now, self.ttl))
            .cloned()
            .collect();
        leases.sort_by_key(|lease| lease.port);
        leases
    }

    /// Number of entries in the table, expired ones included
    pub fn lease_count(&self) -> usize {
        self.lock_table().len()
    }

    /// Remove every expired lease, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        let mut table = self.lock_table();
        let now = self.clock.now_millis();
        table.remove_expired(now, self.ttl)
    }

    // The table is never left half-updated, so a poisoned lock is still usable
    fn lock_table(&self) -> MutexGuard<'_, LeaseTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for PortAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortAllocator")
            .field("range", &self.range)
            .field("ttl", &self.ttl)
            .field("leases", &self.lease_count())
            .finish()
    }
}
