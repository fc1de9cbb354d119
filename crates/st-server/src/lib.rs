//! st-server: Port lease service for shuttle-tunnels
//!
//! Runs next to the tunnel server and hands every agent a remote port that
//! is neither leased to another agent nor bound by any other process. The
//! HTTP lease API, the lease table and its allocator live here, along with
//! the runtime that starts the tunnel server next to the API.

pub mod api;
pub mod lease;
pub mod runtime;
pub mod state;

pub use api::LeaseServer;
pub use lease::{Lease, PortAllocator, PortProber, TcpProber};
pub use runtime::{run_server, serve_with_listener, ServerError};
pub use state::ServerState;
