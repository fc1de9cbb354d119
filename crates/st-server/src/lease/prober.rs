//! OS-level port availability probe

use std::net::TcpListener;

use st_core::ProbeError;

/// Checks whether a port could be bound right now
///
/// The answer is only a snapshot: another process may bind the port
/// right after the probe releases it.
pub trait PortProber: Send + Sync {
    /// `Ok(())` if the port could be bound
    fn probe(&self, port: u16) -> Result<(), ProbeError>;

    fn is_available(&self, port: u16) -> bool {
        self.probe(port).is_ok()
    }
}

/// Probes by binding a TCP listener and dropping it immediately
#[derive(Debug, Clone)]
pub struct TcpProber {
    host: String,
}

impl TcpProber {
    /// Probe on `host` (normally a loopback address)
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new("127.0.0.1")
    }
}

impl PortProber for TcpProber {
    fn probe(&self, port: u16) -> Result<(), ProbeError> {
        let listener = TcpListener::bind((self.host.as_str(), port))
            .map_err(|e| ProbeError::from_io(port, e))?;
        drop(listener);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_port_is_unavailable() {
        let holder = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        let port = holder.local_addr().unwrap().port();

        let prober = TcpProber::default();
        assert!(matches!(prober.probe(port), Err(ProbeError::InUse { .. })));
        assert!(!prober.is_available(port));
    }

    #[test]
    fn test_released_port_is_available() {
        let port = {
            let holder = TcpListener::bind(("127.0.0.1", 0)).unwrap();
            holder.local_addr().unwrap().port()
        };

        assert!(TcpProber::default().is_available(port));
    }

    #[test]
    fn test_probe_leaves_port_free() {
        let port = {
            let holder = TcpListener::bind(("127.0.0.1", 0)).unwrap();
            holder.local_addr().unwrap().port()
        };

        let prober = TcpProber::default();
        assert!(prober.is_available(port));
        // The probe's own listener is gone, so the port binds again
        assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
    }

    #[test]
    fn test_non_local_address_is_unavailable() {
        // TEST-NET-1 is never assigned to a local interface
        let prober = TcpProber::new("192.0.2.1");
        assert!(matches!(prober.probe(10000), Err(ProbeError::Other { .. })));
    }
}
