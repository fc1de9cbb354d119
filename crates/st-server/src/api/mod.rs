//! HTTP lease API
//!
//! `POST /reserve_port` is the only operation agents need; `GET /leases`
//! and `GET /health` are for operators.

mod handlers;
mod server;

pub use server::{router, LeaseServer};
