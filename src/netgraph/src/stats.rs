use std::time::Instant;

use fnv::FnvHashMap as HashMap;

use crate::bandwidth::{Bandwidth, BandwidthTrait};
use crate::{DpId, PortNo};

/// Raw counters reported for one port, as of `ts`.
#[derive(Debug, Clone, Copy)]
struct PortSample {
    tx_bytes: u64,
    rx_bytes: u64,
    ts: Instant,
}

/// Per (switch, port) counter samples from the latest monitoring cycle.
/// Each cycle consumes the previous sample once to form a delta, then
/// replaces it.
#[derive(Debug, Clone)]
pub struct StatsStore {
    samples: HashMap<(DpId, PortNo), PortSample>,
}

impl StatsStore {
    pub fn new() -> Self {
        StatsStore {
            samples: HashMap::default(),
        }
    }

    /// Feeds one observed counter pair and returns the throughput since
    /// the previous sample. `None` on the first observation of a port
    /// and when no time elapsed; the new sample replaces the stored one
    /// either way. A counter that moved backwards (switch reset)
    /// contributes zero rather than underflowing.
    pub fn observe(
        &mut self,
        dpid: DpId,
        port: PortNo,
        tx_bytes: u64,
        rx_bytes: u64,
        now: Instant,
    ) -> Option<Bandwidth> {
        let sample = PortSample {
            tx_bytes,
            rx_bytes,
            ts: now,
        };
        let prev = self.samples.insert((dpid, port), sample)?;
        let elapsed = now.duration_since(prev.ts).as_secs_f64();
        if elapsed <= 0.0 {
            return None;
        }
        let delta_bytes = sample.tx_bytes.saturating_sub(prev.tx_bytes)
            + sample.rx_bytes.saturating_sub(prev.rx_bytes);
        let bits_per_sec = delta_bytes as f64 * 8.0 / elapsed;
        Some((bits_per_sec as u64).bps())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn first_sample_yields_no_throughput() {
        let mut store = StatsStore::new();
        let t0 = Instant::now();
        assert_eq!(store.observe(1, 1, 1000, 2000, t0), None);
        // the sample is stored regardless
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delta_over_elapsed_time() {
        let mut store = StatsStore::new();
        let t0 = Instant::now();
        store.observe(1, 1, 0, 0, t0);

        // 500_000 tx + 125_000 rx bytes over 5 s = 1 Mb/s
        let t1 = t0 + Duration::from_secs(5);
        let tp = store.observe(1, 1, 500_000, 125_000, t1).unwrap();
        assert_eq!(tp.val(), 1_000_000);
    }

    #[test]
    fn zero_elapsed_skips_but_stores() {
        let mut store = StatsStore::new();
        let t0 = Instant::now();
        store.observe(1, 1, 0, 0, t0);
        assert_eq!(store.observe(1, 1, 10_000, 0, t0), None);

        // the skipped sample became the new baseline
        let t1 = t0 + Duration::from_secs(1);
        let tp = store.observe(1, 1, 11_000, 0, t1).unwrap();
        assert_eq!(tp.val(), 8_000);
    }

    #[test]
    fn counter_reset_clamps_to_zero() {
        let mut store = StatsStore::new();
        let t0 = Instant::now();
        store.observe(1, 1, 1_000_000, 1_000_000, t0);
        let tp = store.observe(1, 1, 0, 0, t0 + Duration::from_secs(5)).unwrap();
        assert_eq!(tp.val(), 0);
    }

    #[test]
    fn ports_are_tracked_independently() {
        let mut store = StatsStore::new();
        let t0 = Instant::now();
        store.observe(1, 1, 0, 0, t0);
        // same port number on another switch has no baseline yet
        assert_eq!(store.observe(2, 1, 500, 0, t0 + Duration::from_secs(1)), None);
        assert_eq!(store.len(), 2);
    }
}
