use fnv::FnvHashMap as HashMap;
use petgraph::algo::astar;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::bandwidth::Bandwidth;
use crate::{DpId, PortNo};

/// Weight of an idle link.
pub const WEIGHT_BASE: f64 = 1.0;

/// Weight added on top of the base at full saturation.
pub const WEIGHT_SCALE: f64 = 10.0;

/// Weight of a link running at `utilization` of its capacity.
/// Utilization is clamped to [0, 1], so weights range over [1, 11]:
/// 1 idle, 6 at half load, 11 at or above capacity.
#[inline]
pub fn congestion_weight(utilization: f64) -> f64 {
    WEIGHT_BASE + WEIGHT_SCALE * utilization.min(1.0)
}

/// Payload of one directed edge: the egress port at the source switch,
/// the congestion weight the planner minimizes, and the nominal link
/// capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub port: PortNo,
    pub weight: f64,
    pub capacity: Bandwidth,
}

impl Link {
    #[inline]
    fn new(port: PortNo, capacity: Bandwidth) -> Link {
        Link {
            port,
            weight: WEIGHT_BASE,
            capacity,
        }
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "port {} w={:.2} cap={}", self.port, self.weight, self.capacity)
    }
}

/// The directed switch topology. Every discovered physical link is two
/// edges, one per direction, each with its own egress port and weight.
///
/// Indices must survive switch removal, hence the stable graph; the
/// node map gives O(1) lookup by datapath id.
#[derive(Debug, Default, Clone)]
pub struct TopoGraph {
    graph: StableDiGraph<DpId, Link>,
    node_map: HashMap<DpId, NodeIndex>,
}

impl TopoGraph {
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn switch_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of directed edges.
    #[inline]
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    #[inline]
    pub fn contains(&self, id: DpId) -> bool {
        self.node_map.contains_key(&id)
    }

    /// Adds a switch. Re-adding a known switch is a no-op.
    pub fn add_switch(&mut self, id: DpId) {
        if self.node_map.contains_key(&id) {
            return;
        }
        let ix = self.graph.add_node(id);
        self.node_map.insert(id, ix);
    }

    /// Removes a switch and every edge incident to it, in both
    /// directions. Removing an unknown switch is a no-op.
    pub fn remove_switch(&mut self, id: DpId) {
        if let Some(ix) = self.node_map.remove(&id) {
            self.graph.remove_node(ix);
        }
    }

    /// Installs the two directed edges of a discovered link: src -> dst
    /// with egress `src_port` and dst -> src with egress `dst_port`,
    /// both idle at `capacity`. Unknown endpoints are created on demand;
    /// re-adding an existing link overwrites the edge payloads.
    pub fn add_link(
        &mut self,
        src: DpId,
        dst: DpId,
        src_port: PortNo,
        dst_port: PortNo,
        capacity: Bandwidth,
    ) {
        self.add_switch(src);
        self.add_switch(dst);
        let s = self.node_map[&src];
        let d = self.node_map[&dst];
        self.graph.update_edge(s, d, Link::new(src_port, capacity));
        self.graph.update_edge(d, s, Link::new(dst_port, capacity));
    }

    /// Removes both directions of a link. Absent edges are a no-op.
    pub fn remove_link(&mut self, src: DpId, dst: DpId) {
        let (s, d) = match (self.node_map.get(&src), self.node_map.get(&dst)) {
            (Some(&s), Some(&d)) => (s, d),
            _ => return,
        };
        if let Some(e) = self.graph.find_edge(s, d) {
            self.graph.remove_edge(e);
        }
        if let Some(e) = self.graph.find_edge(d, s) {
            self.graph.remove_edge(e);
        }
    }

    /// Switches directly reachable from `id`.
    pub fn neighbors(&self, id: DpId) -> Vec<DpId> {
        match self.node_map.get(&id) {
            Some(&ix) => self.graph.neighbors(ix).map(|n| self.graph[n]).collect(),
            None => Vec::new(),
        }
    }

    pub fn get_edge(&self, src: DpId, dst: DpId) -> Option<&Link> {
        let s = *self.node_map.get(&src)?;
        let d = *self.node_map.get(&dst)?;
        let e = self.graph.find_edge(s, d)?;
        Some(&self.graph[e])
    }

    /// Overwrites the weight of the src -> dst edge. No-op when absent.
    pub fn set_weight(&mut self, src: DpId, dst: DpId, weight: f64) {
        let (s, d) = match (self.node_map.get(&src), self.node_map.get(&dst)) {
            (Some(&s), Some(&d)) => (s, d),
            _ => return,
        };
        if let Some(e) = self.graph.find_edge(s, d) {
            self.graph[e].weight = weight;
        }
    }

    /// Folds a measured port throughput into the edge weights of `dpid`.
    ///
    /// An edge is identified by its egress port, not its destination:
    /// the throughput updates every outgoing edge whose egress port
    /// equals `port`, whichever switch it currently leads to. One
    /// physical port serves one link, so this is the natural keying for
    /// per-port counters.
    pub fn record_port_load(&mut self, dpid: DpId, port: PortNo, throughput: Bandwidth) {
        let ix = match self.node_map.get(&dpid) {
            Some(&ix) => ix,
            None => return,
        };
        let matched: Vec<_> = self
            .graph
            .edges(ix)
            .filter(|e| e.weight().port == port)
            .map(|e| (e.id(), self.graph[e.target()]))
            .collect();
        for (eid, peer) in matched {
            let link = &mut self.graph[eid];
            let utilization = throughput.fraction_of(link.capacity);
            link.weight = congestion_weight(utilization);
            if throughput.val() > 100_000 {
                log::debug!(
                    "link {} -> {}: {}, weight={:.2}",
                    dpid,
                    peer,
                    throughput,
                    link.weight
                );
            }
        }
    }

    /// Least-congested path from `src` to `dst` under the current edge
    /// weights, as an inclusive switch sequence. `None` when the two
    /// switches are not connected. Weights never go below 1, so the
    /// search is a plain Dijkstra; for a fixed graph the result is
    /// stable across calls.
    pub fn best_path(&self, src: DpId, dst: DpId) -> Option<Vec<DpId>> {
        if src == dst {
            return Some(vec![src]);
        }
        let s = *self.node_map.get(&src)?;
        let d = *self.node_map.get(&dst)?;
        let (_cost, path) = astar(&self.graph, s, |n| n == d, |e| e.weight().weight, |_| 0.0)?;
        Some(path.into_iter().map(|ix| self.graph[ix]).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bandwidth::BandwidthTrait;

    fn cap() -> Bandwidth {
        100.mbps()
    }

    #[test]
    fn add_link_installs_both_directions() {
        let mut topo = TopoGraph::new();
        topo.add_link(1, 2, 7, 9, cap());

        let fwd = topo.get_edge(1, 2).unwrap();
        assert_eq!(fwd.port, 7);
        assert_eq!(fwd.weight, 1.0);
        assert_eq!(fwd.capacity, cap());

        let rev = topo.get_edge(2, 1).unwrap();
        assert_eq!(rev.port, 9);
        assert_eq!(rev.weight, 1.0);
        assert_eq!(rev.capacity, cap());
    }

    #[test]
    fn add_operations_are_idempotent() {
        let mut topo = TopoGraph::new();
        topo.add_switch(1);
        topo.add_switch(1);
        assert_eq!(topo.switch_count(), 1);

        topo.add_link(1, 2, 7, 9, cap());
        topo.add_link(1, 2, 7, 9, cap());
        assert_eq!(topo.switch_count(), 2);
        assert_eq!(topo.link_count(), 2);
        assert_eq!(topo.get_edge(1, 2).unwrap().port, 7);
    }

    #[test]
    fn remove_link_drops_both_directions() {
        let mut topo = TopoGraph::new();
        topo.add_link(1, 2, 7, 9, cap());
        topo.remove_link(1, 2);
        assert!(topo.get_edge(1, 2).is_none());
        assert!(topo.get_edge(2, 1).is_none());
        assert_eq!(topo.link_count(), 0);

        // absent removals never raise
        topo.remove_link(1, 2);
        topo.remove_link(5, 6);
        topo.remove_switch(42);
    }

    #[test]
    fn remove_switch_cascades_edges() {
        let mut topo = TopoGraph::new();
        topo.add_link(1, 2, 1, 1, cap());
        topo.add_link(2, 3, 2, 1, cap());
        assert_eq!(topo.best_path(1, 3).unwrap(), vec![1, 2, 3]);

        topo.remove_switch(2);
        assert!(!topo.contains(2));
        assert!(topo.get_edge(1, 2).is_none());
        assert!(topo.get_edge(2, 1).is_none());
        assert_eq!(topo.best_path(1, 3), None);
    }

    #[test]
    fn neighbors_follow_outgoing_edges() {
        let mut topo = TopoGraph::new();
        topo.add_link(1, 2, 1, 1, cap());
        topo.add_link(1, 3, 2, 1, cap());
        let mut n = topo.neighbors(1);
        n.sort_unstable();
        assert_eq!(n, vec![2, 3]);
        assert!(topo.neighbors(9).is_empty());
    }

    #[test]
    fn best_path_trivial_and_disconnected() {
        let mut topo = TopoGraph::new();
        topo.add_switch(1);
        assert_eq!(topo.best_path(1, 1).unwrap(), vec![1]);

        // two disjoint components
        topo.add_link(1, 2, 1, 1, cap());
        topo.add_link(3, 4, 1, 1, cap());
        assert_eq!(topo.best_path(1, 3), None);
        assert_eq!(topo.best_path(1, 99), None);
    }

    #[test]
    fn best_path_follows_chain() {
        let mut topo = TopoGraph::new();
        topo.add_link(1, 2, 1, 1, cap());
        topo.add_link(2, 3, 2, 1, cap());
        assert_eq!(topo.best_path(1, 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn saturated_link_diverts_path() {
        let mut topo = TopoGraph::new();
        topo.add_link(1, 2, 1, 1, cap());
        topo.add_link(2, 3, 2, 1, cap());
        topo.add_link(1, 4, 2, 1, cap());
        topo.add_link(4, 3, 2, 2, cap());
        // both routes cost 2 hops; the direct one wins or ties until it
        // congests
        topo.set_weight(1, 2, 11.0);
        assert_eq!(topo.best_path(1, 3).unwrap(), vec![1, 4, 3]);
    }

    #[test]
    fn port_load_updates_matching_edges_only() {
        let mut topo = TopoGraph::new();
        topo.add_link(1, 2, 1, 1, cap());
        topo.add_link(1, 3, 2, 1, cap());

        topo.record_port_load(1, 1, 50.mbps());
        assert_eq!(topo.get_edge(1, 2).unwrap().weight, 6.0);
        assert_eq!(topo.get_edge(1, 3).unwrap().weight, 1.0);
        assert_eq!(topo.get_edge(2, 1).unwrap().weight, 1.0);

        // above capacity the utilization clamps at 1
        topo.record_port_load(1, 1, 250.mbps());
        assert_eq!(topo.get_edge(1, 2).unwrap().weight, 11.0);

        // unknown switch or port is a no-op
        topo.record_port_load(9, 1, 50.mbps());
        topo.record_port_load(1, 77, 50.mbps());
    }

    #[test]
    fn weight_formula_endpoints() {
        assert_eq!(congestion_weight(0.0), 1.0);
        assert_eq!(congestion_weight(0.5), 6.0);
        assert_eq!(congestion_weight(1.0), 11.0);
        assert_eq!(congestion_weight(2.5), 11.0);
    }
}
