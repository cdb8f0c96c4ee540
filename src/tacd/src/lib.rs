//! Traffic-aware controller agent. Consumes discovery, lifecycle,
//! telemetry, and packet-in events on a single queue, keeps the
//! topology weighted by measured utilization, and pushes forwarding
//! rules over per-switch control sessions.

pub mod argument;
pub mod channel;
pub mod config;
pub mod controller;
pub mod event;
pub mod installer;
pub mod monitor;
