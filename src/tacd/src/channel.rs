use netgraph::hosts::EthAddr;
use netgraph::{DpId, PortNo};

/// Priority of the table-miss fallback installed on connection.
pub const MISS_PRIORITY: u16 = 0;

/// Priority of the per-pair forwarding rules.
pub const PATH_PRIORITY: u16 = 1;

/// A match-and-forward instruction: exact (src, dst) address match,
/// output to one port. Rules are permanent; re-installing the same
/// match is an overwrite on the switch side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRule {
    pub src: EthAddr,
    pub dst: EthAddr,
    pub out_port: PortNo,
    pub priority: u16,
}

/// Where a packet-out sends the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputAction {
    Port(PortNo),
    /// broadcast to all ports except the ingress
    Flood,
}

/// One switch control session. Every send is fire-and-forget: no
/// acknowledgment, timeout, or cancellation is tracked on this side.
pub trait ControlChannel {
    /// Lowest-priority fallback that punts unmatched traffic to the
    /// controller. Issued once when the switch connects.
    fn install_table_miss(&mut self);
    fn install_rule(&mut self, rule: &FlowRule);
    fn request_port_stats(&mut self);
    fn packet_out(&mut self, in_port: PortNo, action: OutputAction, data: &[u8]);
}

/// Control session that only records the command stream in the log.
/// Stands in when no protocol frontend is attached.
#[derive(Debug, Clone)]
pub struct LogChannel {
    dpid: DpId,
}

impl LogChannel {
    pub fn new(dpid: DpId) -> Self {
        LogChannel { dpid }
    }
}

impl ControlChannel for LogChannel {
    fn install_table_miss(&mut self) {
        log::info!("dpid {}: install table-miss (prio {})", self.dpid, MISS_PRIORITY);
    }

    fn install_rule(&mut self, rule: &FlowRule) {
        log::info!(
            "dpid {}: install rule {} -> {} out_port={} prio={}",
            self.dpid,
            rule.src,
            rule.dst,
            rule.out_port,
            rule.priority
        );
    }

    fn request_port_stats(&mut self) {
        log::debug!("dpid {}: request port stats", self.dpid);
    }

    fn packet_out(&mut self, in_port: PortNo, action: OutputAction, data: &[u8]) {
        log::debug!(
            "dpid {}: packet-out in_port={} action={:?} len={}",
            self.dpid,
            in_port,
            action,
            data.len()
        );
    }
}
