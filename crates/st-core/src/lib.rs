//! st-core: Core abstractions and configuration for shuttle-tunnels
//!
//! This crate provides the configuration structures, error taxonomy,
//! clock abstraction and the boundary to the external tunneling library
//! shared by the lease server, the agent and the CLI.

pub mod config;
pub mod error;
pub mod time;
pub mod tunnel;
pub mod types;

pub use error::{ConfigError, LeaseError, ProbeError, ShuttleError, TunnelError};
pub use time::{Clock, ManualClock, SystemClock};
pub use types::AgentId;
