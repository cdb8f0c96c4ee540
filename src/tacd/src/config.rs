use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use netgraph::hosts::EthAddr;
use netgraph::{DpId, PortNo};

/// One entry of the proactive-installation registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownHost {
    pub addr: EthAddr,
    pub dpid: DpId,
    pub port: PortNo,
}

/// The known hosts and their attachment points, as read from a TOML
/// file of `[[host]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostRegistry {
    #[serde(rename = "host", default)]
    pub hosts: Vec<KnownHost>,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("parse {}: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
}

pub fn read_hosts<P: AsRef<Path>>(path: P) -> Result<HostRegistry, ConfigError> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_owned(), e))?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_owned(), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_parses_host_tables() {
        let registry: HostRegistry = toml::from_str(
            r#"
            [[host]]
            addr = "00:00:00:00:00:01"
            dpid = 2
            port = 4

            [[host]]
            addr = "00:00:00:00:00:02"
            dpid = 7
            port = 1
            "#,
        )
        .unwrap();
        assert_eq!(registry.hosts.len(), 2);
        assert_eq!(registry.hosts[0].dpid, 2);
        assert_eq!(registry.hosts[0].port, 4);
        assert_eq!(registry.hosts[1].addr.to_string(), "00:00:00:00:00:02");
    }

    #[test]
    fn empty_document_is_an_empty_registry() {
        let registry: HostRegistry = toml::from_str("").unwrap();
        assert!(registry.hosts.is_empty());
    }

    #[test]
    fn malformed_address_is_rejected() {
        let res: Result<HostRegistry, _> = toml::from_str(
            r#"
            [[host]]
            addr = "not-a-mac"
            dpid = 1
            port = 1
            "#,
        );
        assert!(res.is_err());
    }
}
