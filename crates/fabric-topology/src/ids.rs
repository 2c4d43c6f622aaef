//! Node identities and link-state identifiers.
//!
//! A fabric node is known by two names:
//! - its loopback IPv4 address ([`NodeId`]), used for overlay peering
//! - its link-state identifier ([`LinkStateId`]), the NET advertised in the
//!   underlay (`area.system-id.selector`, e.g. `49.0001.1a0d.00ff.0000.00`)
//!
//! Neighbor lists in link-state records only carry the second form, so the
//! topology maintainer has to cross-reference the two.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{Result, TopologyError};

/// Loopback identity of a fabric node.
///
/// Ordering is numeric on the address, which is the canonical order used for
/// indexing and for every role list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct NodeId(Ipv4Addr);

impl NodeId {
    /// Wrap an address without range checks.
    pub const fn new(addr: Ipv4Addr) -> Self {
        Self(addr)
    }

    /// The underlying address.
    pub const fn addr(&self) -> Ipv4Addr {
        self.0
    }
}

impl FromStr for NodeId {
    type Err = TopologyError;

    /// Parse a loopback address. Rejects `0.0.0.0` and anything outside the
    /// unicast first-octet range `1..=223`.
    fn from_str(s: &str) -> Result<Self> {
        let addr: Ipv4Addr = s
            .trim()
            .parse()
            .map_err(|_| TopologyError::InvalidNodeId(s.to_string()))?;
        let first = addr.octets()[0];
        if addr.is_unspecified() || !(1..=223).contains(&first) {
            return Err(TopologyError::InvalidNodeId(s.to_string()));
        }
        Ok(Self(addr))
    }
}

impl From<NodeId> for Ipv4Addr {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Six byte system identifier rendered as three 4-hex groups.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SystemId(String);

impl SystemId {
    /// Derive the system id from a chassis MAC (`1a:0d:00:ff:00:00` →
    /// `1a0d.00ff.0000`).
    pub fn from_mac(mac: &str) -> Result<Self> {
        let digits: String = mac
            .trim()
            .chars()
            .filter(|c| *c != ':' && *c != '-' && *c != '.')
            .collect();
        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TopologyError::InvalidMac(mac.to_string()));
        }
        let digits = digits.to_ascii_lowercase();
        let groups = [&digits[0..4], &digits[4..8], &digits[8..12]];
        Ok(Self(groups.join(".")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hierarchical link-state identifier (area + system id + selector).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct LinkStateId(String);

impl LinkStateId {
    /// Selector appended to a node's own NET.
    pub const NODE_SELECTOR: &'static str = "00";

    /// Build `area.system.00`.
    pub fn from_parts(area: &str, system: &SystemId) -> Result<Self> {
        format!("{}.{}.{}", area, system, Self::NODE_SELECTOR).parse()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for LinkStateId {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let groups: Vec<&str> = normalized.split('.').collect();
        let well_formed = groups.len() >= 2
            && groups
                .iter()
                .all(|g| (1..=4).contains(&g.len()) && g.chars().all(|c| c.is_ascii_hexdigit()));
        if !well_formed {
            return Err(TopologyError::InvalidLinkStateId(s.to_string()));
        }
        Ok(Self(normalized))
    }
}

impl fmt::Display for LinkStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
