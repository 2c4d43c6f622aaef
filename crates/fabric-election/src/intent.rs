//! Configuration intents.
//!
//! Intents describe what the local device should look like. They are handed
//! to a sink that owns the actual configuration channel; nothing here talks
//! to a device.

use serde::{Deserialize, Serialize};

use fabric_topology::{LinkStateId, NodeId};

use crate::underlay::Level;

/// Something the local node should apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ConfigIntent {
    /// Change to the link-state underlay
    Underlay(UnderlayIntent),
    /// Enable the overlay, replacing any previous overlay configuration
    EnableOverlay(OverlayConfig),
    /// Remove the overlay peer group
    WithdrawOverlay,
}

impl ConfigIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigIntent::Underlay(_) => "underlay",
            ConfigIntent::EnableOverlay(_) => "enable_overlay",
            ConfigIntent::WithdrawOverlay => "withdraw_overlay",
        }
    }
}

/// Full overlay configuration of the local node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    pub local_as: u32,
    pub router_id: NodeId,
    pub peer_group: String,
    /// Set only on route reflectors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<NodeId>,
    pub peers: Vec<OverlayPeer>,
}

impl OverlayConfig {
    pub fn is_reflector(&self) -> bool {
        self.cluster_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayPeer {
    pub address: NodeId,
    pub role: PeerRole,
}

/// What the remote end of an overlay session is to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerRole {
    /// A leaf we reflect routes to
    Client,
    /// A route reflector
    Reflector,
}

/// Change to the link-state underlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UnderlayIntent {
    /// Bring up the link-state instance on the loopback
    Instance {
        instance: String,
        level: Level,
        net: LinkStateId,
        loopback: String,
    },
    /// Run the link-state protocol on a fabric-facing interface
    EnableInterface {
        instance: String,
        interface: String,
        subinterface: String,
        circuit: CircuitType,
        unnumbered_via: String,
    },
    DisableInterface {
        instance: String,
        interface: String,
        subinterface: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitType {
    PointToPoint,
    Broadcast,
}
