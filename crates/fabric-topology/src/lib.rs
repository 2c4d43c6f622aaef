//! Fabric Topology
//!
//! Link-state view of a data-center fabric, rebuilt incrementally from a
//! stream of join / update / leave events.
//!
//! # Model
//!
//! - [`NodeId`]: loopback IPv4 identity of a node
//! - [`LinkStateId`]: the node's NET in the underlay (area + system id)
//! - [`FabricNode`]: a node plus its advertised adjacencies
//! - [`FabricGraph`]: every known node, keyed by identity
//!
//! # Maintenance
//!
//! [`TopologyState::apply_event`] is the only mutation path. Each event
//! replaces the target node wholesale, then a resolution pass maps every
//! advertised neighbor NET to a known identity. References to nodes that
//! have not been announced yet stay pending and resolve later.

mod error;
mod event;
mod graph;
mod ids;
mod node;
mod state;

pub use error::{Result, TopologyError};
pub use event::{EventKind, LinkStateEvent, NeighborRecord, RawLinkStateEvent, RawNeighborRecord};
pub use graph::FabricGraph;
pub use ids::{LinkStateId, NodeId, SystemId};
pub use node::{Adjacency, FabricNode};
pub use state::{Applied, TopologyConfig, TopologyState};

/// Metric advertised for a directly-connected neighbor.
pub const DIRECT_LINK_METRIC: u32 = 10;

/// Default underlay area.
pub const DEFAULT_AREA: &str = "49.0001";
