use std::convert::TryInto;

use fnv::FnvHashMap as HashMap;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::{DpId, PortNo};

/// A host hardware address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EthAddr([u8; 6]);

#[derive(Error, Debug)]
#[error("invalid hardware address: {0}")]
pub struct EthAddrParseError(String);

impl std::str::FromStr for EthAddr {
    type Err = EthAddrParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octets: Vec<u8> = s
            .split(':')
            .map(|x| u8::from_str_radix(x, 16))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| EthAddrParseError(s.to_owned()))?;
        Ok(EthAddr(
            octets
                .try_into()
                .map_err(|_| EthAddrParseError(s.to_owned()))?,
        ))
    }
}

impl From<[u8; 6]> for EthAddr {
    fn from(octets: [u8; 6]) -> Self {
        EthAddr(octets)
    }
}

impl EthAddr {
    #[inline]
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl std::fmt::Display for EthAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let o = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            o[0], o[1], o[2], o[3], o[4], o[5]
        )
    }
}

// serialized as the colon-separated string so addresses read naturally
// in config files and logs
impl Serialize for EthAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EthAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Where a host attaches to the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostLoc {
    pub dpid: DpId,
    pub port: PortNo,
}

/// Last observed attachment point per hardware address. Entries are
/// overwritten by newer observations; there is no leave signal, so they
/// never expire.
#[derive(Debug, Default, Clone)]
pub struct HostTable {
    map: HashMap<EthAddr, HostLoc>,
}

impl HostTable {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn learn(&mut self, addr: EthAddr, dpid: DpId, port: PortNo) {
        self.map.insert(addr, HostLoc { dpid, port });
    }

    pub fn lookup(&self, addr: &EthAddr) -> Option<HostLoc> {
        self.map.get(addr).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_roundtrip() {
        let addr: EthAddr = "00:1b:44:11:3a:b7".parse().unwrap();
        assert_eq!(addr.octets(), [0x00, 0x1b, 0x44, 0x11, 0x3a, 0xb7]);
        assert_eq!(addr.to_string(), "00:1b:44:11:3a:b7");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!("00:1b:44:11:3a".parse::<EthAddr>().is_err());
        assert!("00:1b:44:11:3a:b7:aa".parse::<EthAddr>().is_err());
        assert!("zz:1b:44:11:3a:b7".parse::<EthAddr>().is_err());
        assert!("".parse::<EthAddr>().is_err());
    }

    #[test]
    fn learn_overwrites_previous_location() {
        let mut table = HostTable::new();
        let addr: EthAddr = "00:00:00:00:00:01".parse().unwrap();
        table.learn(addr, 1, 3);
        assert_eq!(table.lookup(&addr), Some(HostLoc { dpid: 1, port: 3 }));

        // the host moved; the newer observation wins
        table.learn(addr, 5, 2);
        assert_eq!(table.lookup(&addr), Some(HostLoc { dpid: 5, port: 2 }));
        assert_eq!(table.len(), 1);
    }
}
