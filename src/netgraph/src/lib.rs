//! Core model for a traffic-aware forwarding controller: the switch
//! topology graph with per-link congestion weights, the host location
//! table, and the port-counter store that turns raw counters into
//! measured throughput.

pub mod bandwidth;

pub mod topo;

pub mod hosts;
pub mod stats;

/// A switch is identified by its datapath id.
pub type DpId = u64;

/// Switch port number.
pub type PortNo = u32;

/// The switch-local management port. Its counters do not describe any
/// inter-switch link and are excluded from telemetry.
pub const LOCAL_PORT: PortNo = 0xfffffffe;
