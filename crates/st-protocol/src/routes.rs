//! HTTP routes served by the lease service

/// Reserve a remote port for an agent (`POST`)
pub const RESERVE_PORT_PATH: &str = "/reserve_port";

/// List live leases (`GET`, diagnostics only)
pub const LEASES_PATH: &str = "/leases";

/// Liveness probe (`GET`)
pub const HEALTH_PATH: &str = "/health";
