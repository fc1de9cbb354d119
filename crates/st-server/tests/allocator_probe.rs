//! Allocator tests against real sockets

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use st_core::config::PortRange;
use st_core::{LeaseError, SystemClock};
use st_server::{PortAllocator, TcpProber};

#[test]
fn test_externally_bound_port_is_never_leased() {
    let holder = TcpListener::bind(("127.0.0.1", 0)).unwrap();
    let port = holder.local_addr().unwrap().port();

    let allocator = PortAllocator::with_parts(
        PortRange::new(port, port),
        Some(Duration::from_secs(60)),
        Arc::new(TcpProber::default()),
        Arc::new(SystemClock),
    );

    assert_eq!(
        allocator.allocate("agent"),
        Err(LeaseError::NoFreePort {
            start: port,
            end: port
        })
    );
    assert!(allocator.lease(port).is_none());

    drop(holder);
    assert_eq!(allocator.allocate("agent"), Ok(port));
    assert!(allocator.lease(port).is_some());
}

#[test]
fn test_leased_port_stays_bindable_for_the_tunnel() {
    let port = {
        let holder = TcpListener::bind(("127.0.0.1", 0)).unwrap();
        holder.local_addr().unwrap().port()
    };

    let allocator = PortAllocator::with_parts(
        PortRange::new(port, port),
        Some(Duration::from_secs(60)),
        Arc::new(TcpProber::default()),
        Arc::new(SystemClock),
    );

    assert_eq!(allocator.allocate("agent"), Ok(port));
    // The probe released the port, so the tunnel server can take it
    assert!(TcpListener::bind(("127.0.0.1", port)).is_ok());
}
