use netgraph::hosts::EthAddr;
use netgraph::{DpId, PortNo};

use crate::channel::{ControlChannel, FlowRule, PATH_PRIORITY};
use crate::config::KnownHost;
use crate::controller::Controller;

/// One-shot state for the bulk installation pass. The trigger may arm
/// it any number of times; `done` makes the execution unique.
#[derive(Debug, Default)]
pub struct ProactiveInstall {
    pub(crate) done: bool,
    pub(crate) hosts: Vec<KnownHost>,
}

impl ProactiveInstall {
    pub fn new(hosts: Vec<KnownHost>) -> Self {
        ProactiveInstall { done: false, hosts }
    }
}

impl<C: ControlChannel + Send + 'static> Controller<C> {
    /// Installs the (src, dst) forwarding rule on every reachable
    /// switch of `path`. The last switch outputs to the destination
    /// host port; every other switch outputs toward its successor.
    /// Switches without a session, or whose egress edge vanished under
    /// us, are skipped without aborting the rest of the path.
    pub fn install_path(
        &mut self,
        path: &[DpId],
        src: EthAddr,
        dst: EthAddr,
        _in_port: PortNo,
        out_port: PortNo,
    ) {
        for (i, &dpid) in path.iter().enumerate() {
            let egress = if i == path.len() - 1 {
                Some(out_port)
            } else {
                self.topo.get_edge(dpid, path[i + 1]).map(|l| l.port)
            };
            let egress = match egress {
                Some(port) => port,
                None => continue,
            };
            let channel = match self.datapaths.get_mut(&dpid) {
                Some(channel) => channel,
                None => continue,
            };
            channel.install_rule(&FlowRule {
                src,
                dst,
                out_port: egress,
                priority: PATH_PRIORITY,
            });
        }
    }

    /// Bulk pass over every ordered pair of registered hosts: record
    /// each host's attachment point, then install the current best
    /// path per pair. Runs at most once; later deadlines are no-ops.
    pub fn install_all_known_pairs(&mut self) {
        if self.proactive.done {
            return;
        }
        self.proactive.done = true;

        let hosts = self.proactive.hosts.clone();
        if hosts.is_empty() {
            log::info!("proactive install: no hosts registered");
            return;
        }
        for h in &hosts {
            self.hosts.learn(h.addr, h.dpid, h.port);
        }
        log::info!("proactive install: {} hosts registered", hosts.len());

        let mut installed = 0;
        let mut unreachable = 0;
        for a in &hosts {
            for b in &hosts {
                if a.addr == b.addr {
                    continue;
                }
                match self.topo.best_path(a.dpid, b.dpid) {
                    Some(path) => {
                        self.install_path(&path, a.addr, b.addr, a.port, b.port);
                        installed += 1;
                    }
                    None => unreachable += 1,
                }
            }
        }
        log::info!(
            "proactive install complete: {} pairs installed, {} unreachable",
            installed,
            unreachable
        );
    }
}
