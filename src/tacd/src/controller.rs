use std::sync::mpsc;
use std::time::{Duration, Instant};

use fnv::FnvHashMap as HashMap;

use netgraph::bandwidth::{Bandwidth, BandwidthTrait};
use netgraph::hosts::HostTable;
use netgraph::stats::StatsStore;
use netgraph::topo::TopoGraph;
use netgraph::{DpId, PortNo, LOCAL_PORT};

use crate::argument::Opts;
use crate::channel::{ControlChannel, OutputAction};
use crate::config::KnownHost;
use crate::event::{EthFrame, Event, LinkSpec, PortStat};
use crate::installer::ProactiveInstall;
use crate::monitor::send_after;

/// A topology summary is logged every this many monitoring cycles.
const TOPOLOGY_LOG_CYCLES: u64 = 6;

/// Settings the controller consumes per event.
#[derive(Debug, Clone)]
pub struct ControllerCfg {
    /// nominal capacity assumed for discovered links
    pub capacity: Bandwidth,
    /// directed-edge count that arms the proactive installation
    pub proactive_threshold: usize,
    /// settle delay between the trigger and the installation
    pub settle_delay: Duration,
}

impl ControllerCfg {
    pub fn from_opts(opts: &Opts) -> Self {
        ControllerCfg {
            capacity: opts.capacity_mbps.mbps(),
            proactive_threshold: opts.proactive_threshold,
            settle_delay: Duration::from_secs(opts.settle_delay_secs),
        }
    }
}

impl Default for ControllerCfg {
    fn default() -> Self {
        ControllerCfg {
            capacity: 100.mbps(),
            proactive_threshold: 10,
            settle_delay: Duration::from_secs(3),
        }
    }
}

/// The whole controller state behind one event queue: the weighted
/// topology, host locations, port counters, connected sessions, and
/// the one-shot proactive state. Only the thread draining the queue
/// touches any of it; the monitor and deferred timers merely send
/// events.
pub struct Controller<C: ControlChannel> {
    pub(crate) topo: TopoGraph,
    pub(crate) hosts: HostTable,
    pub(crate) stats: StatsStore,
    pub(crate) datapaths: HashMap<DpId, C>,
    pub(crate) proactive: ProactiveInstall,
    pub(crate) cfg: ControllerCfg,
    tx: mpsc::Sender<Event<C>>,
    cycles: u64,
}

impl<C: ControlChannel + Send + 'static> Controller<C> {
    pub fn new(cfg: ControllerCfg, known_hosts: Vec<KnownHost>, tx: mpsc::Sender<Event<C>>) -> Self {
        Controller {
            topo: TopoGraph::new(),
            hosts: HostTable::new(),
            stats: StatsStore::new(),
            datapaths: HashMap::default(),
            proactive: ProactiveInstall::new(known_hosts),
            cfg,
            tx,
            cycles: 0,
        }
    }

    pub fn topology(&self) -> &TopoGraph {
        &self.topo
    }

    pub fn host_table(&self) -> &HostTable {
        &self.hosts
    }

    /// Drains the queue until every sender is gone.
    pub fn run(&mut self, rx: mpsc::Receiver<Event<C>>) {
        log::info!("entering controller loop");
        for event in rx.iter() {
            self.handle(event);
        }
        log::info!("controller loop finished");
    }

    pub fn handle(&mut self, event: Event<C>) {
        match event {
            Event::SwitchConnected(dpid, channel) => self.on_switch_connected(dpid, channel),
            Event::SwitchDisconnected(dpid) => {
                if self.datapaths.remove(&dpid).is_some() {
                    log::info!("switch disconnected: dpid={}", dpid);
                }
            }
            Event::SwitchEnter(dpid) => {
                self.topo.add_switch(dpid);
                log::info!("switch joined topology: dpid={}", dpid);
            }
            Event::SwitchLeave(dpid) => {
                self.topo.remove_switch(dpid);
                log::info!("switch left topology: dpid={}", dpid);
            }
            Event::LinkAdd(spec) => self.on_link_add(spec),
            Event::LinkDelete(src, dst) => {
                self.topo.remove_link(src, dst);
                log::info!("link removed: {} <-> {}", src, dst);
            }
            Event::StatsReply(dpid, stats) => self.apply_stats(dpid, &stats, Instant::now()),
            Event::PacketIn {
                dpid,
                in_port,
                frame,
                data,
            } => self.on_packet_in(dpid, in_port, frame, &data),
            Event::MonitorTick => self.on_monitor_tick(),
            Event::ProactiveDeadline => self.install_all_known_pairs(),
        }
    }

    /// A duplicate connect keeps the existing session; the table-miss
    /// fallback is installed once per registration.
    fn on_switch_connected(&mut self, dpid: DpId, mut channel: C) {
        if self.datapaths.contains_key(&dpid) {
            return;
        }
        channel.install_table_miss();
        self.datapaths.insert(dpid, channel);
        log::info!("switch connected: dpid={}", dpid);
    }

    fn on_link_add(&mut self, spec: LinkSpec) {
        self.topo.add_link(
            spec.src,
            spec.dst,
            spec.src_port,
            spec.dst_port,
            self.cfg.capacity,
        );
        log::info!(
            "link added: {}(port {}) <-> {}(port {})",
            spec.src,
            spec.src_port,
            spec.dst,
            spec.dst_port
        );
        if !self.proactive.done && self.topo.link_count() >= self.cfg.proactive_threshold {
            log::info!(
                "proactive install armed at {} links, settling {:?}",
                self.topo.link_count(),
                self.cfg.settle_delay
            );
            send_after(self.tx.clone(), self.cfg.settle_delay, Event::ProactiveDeadline);
        }
    }

    /// Folds one stats reply into the counter store and the edge
    /// weights. Ports without a usable delta still refresh their
    /// sample; the local port never describes a link and is skipped
    /// outright.
    pub(crate) fn apply_stats(&mut self, dpid: DpId, stats: &[PortStat], now: Instant) {
        for stat in stats {
            if stat.port_no == LOCAL_PORT {
                continue;
            }
            if let Some(throughput) =
                self.stats
                    .observe(dpid, stat.port_no, stat.tx_bytes, stat.rx_bytes, now)
            {
                self.topo.record_port_load(dpid, stat.port_no, throughput);
            }
        }
    }

    fn on_monitor_tick(&mut self) {
        for channel in self.datapaths.values_mut() {
            channel.request_port_stats();
        }
        if self.cycles % TOPOLOGY_LOG_CYCLES == 0 && self.topo.switch_count() > 0 {
            log::info!(
                "topology: {} switches, {} links, {} known hosts",
                self.topo.switch_count(),
                self.topo.link_count(),
                self.hosts.len()
            );
        }
        self.cycles += 1;
    }

    /// Per-packet decision: learn the source, then flood, output
    /// directly, or output along the least-congested path while
    /// installing its rules. Exactly one packet-out per data packet;
    /// rule installation is a side effect, never a precondition.
    fn on_packet_in(&mut self, dpid: DpId, in_port: PortNo, frame: EthFrame, data: &[u8]) {
        if frame.is_discovery() {
            return;
        }

        self.hosts.learn(frame.src, dpid, in_port);

        let action = match self.hosts.lookup(&frame.dst) {
            None => OutputAction::Flood,
            Some(loc) if loc.dpid == dpid => OutputAction::Port(loc.port),
            Some(loc) => match self.topo.best_path(dpid, loc.dpid) {
                Some(path) if path.len() >= 2 => {
                    let next_hop = self.topo.get_edge(path[0], path[1]).map(|l| l.port);
                    self.install_path(&path, frame.src, frame.dst, in_port, loc.port);
                    match next_hop {
                        Some(port) => OutputAction::Port(port),
                        None => OutputAction::Flood,
                    }
                }
                _ => {
                    log::warn!("no path from {} to {}, flooding", dpid, loc.dpid);
                    OutputAction::Flood
                }
            },
        };

        if let Some(channel) = self.datapaths.get_mut(&dpid) {
            channel.packet_out(in_port, action, data);
        }
    }
}
