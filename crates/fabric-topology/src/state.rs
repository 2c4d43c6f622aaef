//! Incremental topology maintenance.
//!
//! Events arrive one at a time and in any order. A node may advertise a
//! neighbor that has not been heard from yet; that reference stays pending
//! until the neighbor's own event shows up. Nothing is rejected for arriving
//! early, so the graph converges once every node has been announced.

use crate::error::{Result, TopologyError};
use crate::{
    EventKind, FabricGraph, FabricNode, LinkStateEvent, LinkStateId, NodeId, DIRECT_LINK_METRIC,
};

/// Tunables for the topology maintainer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyConfig {
    /// Metric carried by directly-connected neighbors; other records are ignored
    pub direct_metric: u32,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            direct_metric: DIRECT_LINK_METRIC,
        }
    }
}

/// Outcome of applying one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new node entered the topology
    Joined(NodeId),
    /// A known node was replaced with fresh data
    Changed(NodeId),
    /// A node left and was scrubbed from its neighbors
    Left(NodeId),
    /// Delete for a node that was never known
    Unknown(NodeId),
}

impl Applied {
    pub fn node(&self) -> NodeId {
        match self {
            Applied::Joined(n) | Applied::Changed(n) | Applied::Left(n) | Applied::Unknown(n) => *n,
        }
    }

    /// Whether the graph was mutated.
    pub fn mutated(&self) -> bool {
        !matches!(self, Applied::Unknown(_))
    }
}

/// Owns the fabric graph and applies link-state events to it.
#[derive(Debug, Clone, Default)]
pub struct TopologyState {
    config: TopologyConfig,
    graph: FabricGraph,
}

impl TopologyState {
    pub fn new(config: TopologyConfig) -> Self {
        Self {
            config,
            graph: FabricGraph::new(),
        }
    }

    pub fn config(&self) -> &TopologyConfig {
        &self.config
    }

    /// Current graph snapshot.
    pub fn graph(&self) -> &FabricGraph {
        &self.graph
    }

    /// Apply one event. On error the graph is left untouched.
    pub fn apply_event(&mut self, event: LinkStateEvent) -> Result<Applied> {
        match event.kind {
            EventKind::Delete => Ok(self.remove(event.node)),
            EventKind::Create | EventKind::Update => self.upsert(event),
        }
    }

    fn upsert(&mut self, event: LinkStateEvent) -> Result<Applied> {
        let node = event.node;
        let link_state_id = event.link_state_id.ok_or_else(|| TopologyError::Malformed {
            node: node.to_string(),
            reason: "missing link-state id".to_string(),
        })?;

        // Group by advertiser, keeping only direct neighbors. An advertiser
        // whose records are all non-direct ends up with an empty list.
        let mut advertised: Vec<(LinkStateId, Vec<LinkStateId>)> = Vec::new();
        for record in event.records {
            let slot = match advertised.iter().position(|(l, _)| *l == record.link_state_id) {
                Some(i) => i,
                None => {
                    advertised.push((record.link_state_id.clone(), Vec::new()));
                    advertised.len() - 1
                }
            };
            if record.metric == self.config.direct_metric {
                advertised[slot].1.push(record.neighbor);
            }
        }

        // A link-state id belongs to exactly one identity.
        let stale = self
            .graph
            .find_by_link_state_id(&link_state_id)
            .map(FabricNode::id)
            .filter(|id| *id != node);
        if let Some(stale) = stale {
            self.graph.remove(stale);
        }

        let existed = self.graph.remove(node).is_some();
        let own = match advertised.iter().position(|(l, _)| *l == link_state_id) {
            Some(i) => advertised.swap_remove(i).1,
            None => Vec::new(),
        };
        self.graph.insert(FabricNode::new(node, link_state_id, own));

        // Records for other known nodes refresh their neighbor lists.
        for (advertiser, neighbors) in advertised {
            let known = self.graph.find_by_link_state_id(&advertiser).map(FabricNode::id);
            if let Some(other) = known.and_then(|id| self.graph.get_mut(id)) {
                other.replace_neighbor_ids(neighbors);
            }
        }

        self.graph.resolve();
        Ok(if existed {
            Applied::Changed(node)
        } else {
            Applied::Joined(node)
        })
    }

    fn remove(&mut self, node: NodeId) -> Applied {
        match self.graph.purge(node) {
            Some(_) => {
                self.graph.resolve();
                Applied::Left(node)
            }
            None => Applied::Unknown(node),
        }
    }
}
