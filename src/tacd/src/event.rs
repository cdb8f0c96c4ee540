use serde::{Deserialize, Serialize};

use netgraph::hosts::EthAddr;
use netgraph::{DpId, PortNo};

/// Ethertype of topology-discovery control frames (LLDP). They belong
/// to the discovery mechanism and are never learned or forwarded.
pub const ETH_TYPE_LLDP: u16 = 0x88cc;

/// Parsed header of a frame punted to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthFrame {
    pub src: EthAddr,
    pub dst: EthAddr,
    pub ethertype: u16,
}

impl EthFrame {
    /// Reads the 14-byte Ethernet header. `None` for runt frames.
    pub fn parse(data: &[u8]) -> Option<EthFrame> {
        if data.len() < 14 {
            return None;
        }
        let mut dst = [0u8; 6];
        dst.copy_from_slice(&data[0..6]);
        let mut src = [0u8; 6];
        src.copy_from_slice(&data[6..12]);
        Some(EthFrame {
            src: src.into(),
            dst: dst.into(),
            ethertype: u16::from_be_bytes([data[12], data[13]]),
        })
    }

    #[inline]
    pub fn is_discovery(&self) -> bool {
        self.ethertype == ETH_TYPE_LLDP
    }
}

/// One discovered link, both endpoints with their port numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub src: DpId,
    pub src_port: PortNo,
    pub dst: DpId,
    pub dst_port: PortNo,
}

/// Counters reported for one port in a stats reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortStat {
    pub port_no: PortNo,
    pub tx_bytes: u64,
    pub rx_bytes: u64,
}

/// Everything the controller reacts to, one variant per notification.
/// All state lives behind one queue of these; events are handled to
/// completion in arrival order on a single thread.
#[derive(Debug)]
pub enum Event<C> {
    /// control session established; carries the session handle
    SwitchConnected(DpId, C),
    SwitchDisconnected(DpId),
    /// topology membership, from the discovery mechanism
    SwitchEnter(DpId),
    SwitchLeave(DpId),
    LinkAdd(LinkSpec),
    LinkDelete(DpId, DpId),
    /// asynchronous reply to an earlier port-stats request
    StatsReply(DpId, Vec<PortStat>),
    /// an unclassified packet, with its raw bytes for forwarding
    PacketIn {
        dpid: DpId,
        in_port: PortNo,
        frame: EthFrame,
        data: Vec<u8>,
    },
    /// periodic cadence from the traffic monitor
    MonitorTick,
    /// the settle delay after a proactive trigger elapsed
    ProactiveDeadline,
}
