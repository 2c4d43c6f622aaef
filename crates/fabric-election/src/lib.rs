//! Fabric Election
//!
//! Turns inferred fabric roles into configuration for the local node.
//!
//! # Overlay
//!
//! A small, deterministic set of route reflectors is elected from the role
//! sets (see [`elect_route_reflectors`]). Reflectors serve the leaves; leaves
//! peer with every reflector; other tiers stay out of the overlay.
//! [`ElectionState`] remembers the last roles and the last applied overlay
//! so that only real changes produce [`ConfigIntent`]s.
//!
//! # Underlay
//!
//! [`AdjacencyTracker`] enables the link-state protocol on interfaces where
//! neighbor discovery found a peer.
//!
//! # Report
//!
//! [`RoleReport`] is the human-readable record of the last election.

mod election;
mod intent;
mod reconcile;
mod report;
mod underlay;

pub use election::{elect_route_reflectors, DEFAULT_RR_COUNT, ELECTION_PRIORITY};
pub use intent::{CircuitType, ConfigIntent, OverlayConfig, OverlayPeer, PeerRole, UnderlayIntent};
pub use reconcile::{
    ElectionConfig, ElectionState, Reconciliation, DEFAULT_OVERLAY_ASN, DEFAULT_PEER_GROUP,
};
pub use report::{ReportParseError, ReportRow, RoleReport};
pub use underlay::{
    AdjacencyEvent, AdjacencyTracker, DiscoveredNeighbor, Level, UnderlayConfig, UnderlayError,
    DEFAULT_INSTANCE, LOOPBACK_SUBINTERFACE,
};
