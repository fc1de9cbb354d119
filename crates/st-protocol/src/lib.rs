//! st-protocol: Wire types for the shuttle-tunnels lease API
//!
//! This crate defines the JSON bodies exchanged between tunnel agents and
//! the lease service running next to the tunnel server.

pub mod message;
pub mod routes;

pub use message::{LeaseInfo, ReservePortRequest, ReservePortResponse, RESERVED_MESSAGE};
pub use routes::{HEALTH_PATH, LEASES_PATH, RESERVE_PORT_PATH};
