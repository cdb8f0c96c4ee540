use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
enum BandwidthUnit {
    Bps = 1,
    Kbps = 1000,
    Mbps = 1_000_000,
    Gbps = 1_000_000_000,
}

impl std::fmt::Display for BandwidthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use BandwidthUnit::*;
        match self {
            Bps => write!(f, "b/s"),
            Kbps => write!(f, "Kb/s"),
            Mbps => write!(f, "Mb/s"),
            Gbps => write!(f, "Gb/s"),
        }
    }
}

pub trait BandwidthTrait {
    fn bps(self) -> Bandwidth;
    fn kbps(self) -> Bandwidth;
    fn mbps(self) -> Bandwidth;
    fn gbps(self) -> Bandwidth;
}

/// A bit rate. The value is kept in bits per second; the unit only
/// selects how it is displayed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bandwidth {
    val: u64,
    unit: BandwidthUnit,
}

impl Bandwidth {
    /// The rate in bits per second.
    #[inline]
    pub fn val(&self) -> u64 {
        self.val
    }

    /// The ratio of this rate to `other`. A zero `other` yields 0.0
    /// rather than dividing by zero.
    #[inline]
    pub fn fraction_of(&self, other: Bandwidth) -> f64 {
        if other.val == 0 {
            return 0.0;
        }
        self.val as f64 / other.val as f64
    }
}

impl BandwidthTrait for Bandwidth {
    fn bps(self) -> Bandwidth {
        Bandwidth {
            val: self.val,
            unit: BandwidthUnit::Bps,
        }
    }
    fn kbps(self) -> Bandwidth {
        Bandwidth {
            val: self.val,
            unit: BandwidthUnit::Kbps,
        }
    }
    fn mbps(self) -> Bandwidth {
        Bandwidth {
            val: self.val,
            unit: BandwidthUnit::Mbps,
        }
    }
    fn gbps(self) -> Bandwidth {
        Bandwidth {
            val: self.val,
            unit: BandwidthUnit::Gbps,
        }
    }
}

impl std::fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}",
            self.val as f64 / self.unit as u64 as f64,
            self.unit
        )
    }
}

impl std::cmp::PartialEq for Bandwidth {
    fn eq(&self, other: &Self) -> bool {
        self.val().eq(&other.val())
    }
}

impl Eq for Bandwidth {}

impl std::cmp::PartialOrd for Bandwidth {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for Bandwidth {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.val().cmp(&other.val())
    }
}

impl std::ops::Add for Bandwidth {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Bandwidth {
            val: self.val + rhs.val,
            unit: self.unit,
        }
    }
}

impl std::ops::Sub for Bandwidth {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Bandwidth {
            val: self.val.saturating_sub(rhs.val),
            unit: self.unit,
        }
    }
}

macro_rules! impl_bandwidth_trait_for {
    ($($ty:ty),+ $(,)?) => (
        $(impl BandwidthTrait for $ty {
            fn bps(self) -> Bandwidth {
                let unit = BandwidthUnit::Bps;
                Bandwidth {
                    val: (self as f64 * unit as u64 as f64) as u64,
                    unit,
                }
            }
            fn kbps(self) -> Bandwidth {
                let unit = BandwidthUnit::Kbps;
                Bandwidth {
                    val: (self as f64 * unit as u64 as f64) as u64,
                    unit,
                }
            }
            fn mbps(self) -> Bandwidth {
                let unit = BandwidthUnit::Mbps;
                Bandwidth {
                    val: (self as f64 * unit as u64 as f64) as u64,
                    unit,
                }
            }
            fn gbps(self) -> Bandwidth {
                let unit = BandwidthUnit::Gbps;
                Bandwidth {
                    val: (self as f64 * unit as u64 as f64) as u64,
                    unit,
                }
            }
        })+
    )
}

impl_bandwidth_trait_for!(u32, u64, i32, i64, usize, f64);
