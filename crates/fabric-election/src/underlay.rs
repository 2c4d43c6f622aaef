//! Underlay bring-up from neighbor discovery.
//!
//! Every interface that discovers a neighbor joins the link-state instance as
//! an unnumbered point-to-point circuit borrowing the loopback address. When
//! the neighbor goes away the interface is disabled again.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use fabric_topology::{EventKind, LinkStateId};

use crate::intent::{CircuitType, ConfigIntent, UnderlayIntent};

/// Default link-state instance name.
pub const DEFAULT_INSTANCE: &str = "i1";

/// Loopback subinterface that fabric links borrow their address from.
pub const LOOPBACK_SUBINTERFACE: &str = "system0.0";

/// Link-state level capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Level {
    #[default]
    L1,
    L2,
    L1L2,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::L1 => "L1",
            Level::L2 => "L2",
            Level::L1L2 => "L1L2",
        };
        f.write_str(s)
    }
}

/// Errors from underlay settings.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UnderlayError {
    #[error("unknown level capability: {0}")]
    InvalidLevel(String),
}

impl FromStr for Level {
    type Err = UnderlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L1" => Ok(Level::L1),
            "L2" => Ok(Level::L2),
            "L1L2" => Ok(Level::L1L2),
            _ => Err(UnderlayError::InvalidLevel(s.trim().to_string())),
        }
    }
}

/// Neighbor discovery notification for one local interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyEvent {
    pub kind: EventKind,
    /// Local interface name, e.g. `ethernet-1/49`
    pub interface: String,
    /// Neighbor chassis id
    pub chassis: String,
    /// Neighbor port id
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub system_description: String,
}

/// Local underlay parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnderlayConfig {
    pub instance: String,
    pub level: Level,
    /// The local node's own link-state id
    pub net: LinkStateId,
    pub loopback: String,
}

impl UnderlayConfig {
    pub fn new(net: LinkStateId) -> Self {
        Self {
            instance: DEFAULT_INSTANCE.to_string(),
            level: Level::default(),
            net,
            loopback: LOOPBACK_SUBINTERFACE.to_string(),
        }
    }

    /// Intent that brings up the instance itself.
    pub fn instance_intent(&self) -> ConfigIntent {
        ConfigIntent::Underlay(UnderlayIntent::Instance {
            instance: self.instance.clone(),
            level: self.level,
            net: self.net.clone(),
            loopback: self.loopback.clone(),
        })
    }
}

/// Neighbor seen on a local interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredNeighbor {
    pub chassis: String,
    pub port: String,
    pub system_description: String,
}

/// Tracks which local interfaces have a neighbor, and therefore run the
/// link-state protocol.
#[derive(Debug)]
pub struct AdjacencyTracker {
    config: UnderlayConfig,
    interfaces: BTreeMap<String, DiscoveredNeighbor>,
}

impl AdjacencyTracker {
    pub fn new(config: UnderlayConfig) -> Self {
        Self {
            config,
            interfaces: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &UnderlayConfig {
        &self.config
    }

    /// Interfaces currently enabled, by name.
    pub fn interfaces(&self) -> &BTreeMap<String, DiscoveredNeighbor> {
        &self.interfaces
    }

    /// Apply one discovery event. Only the first create and a delete of a
    /// known interface produce an intent.
    pub fn apply(&mut self, event: AdjacencyEvent) -> Option<ConfigIntent> {
        let neighbor = DiscoveredNeighbor {
            chassis: event.chassis,
            port: event.port,
            system_description: event.system_description,
        };

        match event.kind {
            EventKind::Create => {
                if let Some(known) = self.interfaces.get_mut(&event.interface) {
                    *known = neighbor;
                    return None;
                }
                info!(
                    interface = %event.interface,
                    chassis = %neighbor.chassis,
                    port = %neighbor.port,
                    "New neighbor"
                );
                self.interfaces.insert(event.interface.clone(), neighbor);
                Some(self.enable(event.interface))
            }
            EventKind::Update => {
                if let Some(known) = self.interfaces.get_mut(&event.interface) {
                    *known = neighbor;
                }
                debug!(interface = %event.interface, "Neighbor updated");
                None
            }
            EventKind::Delete => {
                let removed = self.interfaces.remove(&event.interface)?;
                info!(
                    interface = %event.interface,
                    chassis = %removed.chassis,
                    "Removed neighbor"
                );
                Some(self.disable(event.interface))
            }
        }
    }

    fn enable(&self, interface: String) -> ConfigIntent {
        ConfigIntent::Underlay(UnderlayIntent::EnableInterface {
            instance: self.config.instance.clone(),
            subinterface: format!("{}.0", interface),
            interface,
            circuit: CircuitType::PointToPoint,
            unnumbered_via: self.config.loopback.clone(),
        })
    }

    fn disable(&self, interface: String) -> ConfigIntent {
        ConfigIntent::Underlay(UnderlayIntent::DisableInterface {
            instance: self.config.instance.clone(),
            subinterface: format!("{}.0", interface),
            interface,
        })
    }
}
