//! st-cli: Command-line interface for shuttle-tunnels
//!
//! Provides the `shuttle-tunnels` binary that runs the tunnel server with
//! its port lease service, the tunnel agent, and a few operational helpers.

pub mod commands;
pub mod logging;
pub mod output;
pub mod signal;
