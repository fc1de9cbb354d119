//! Port leasing
//!
//! A lease blocks one port for a fixed TTL after it was handed out. Expired
//! leases are discovered and dropped while scanning; the optional sweep only
//! keeps the table small between scans.

mod allocator;
mod prober;
mod sweep;
mod table;

pub use allocator::PortAllocator;
pub use prober::{PortProber, TcpProber};
pub use sweep::run_lease_sweep;
pub use table::{Lease, LeaseTable};
