//! The fabric graph: every known node keyed by identity.

use std::collections::{BTreeMap, HashMap};

use crate::{FabricNode, LinkStateId, NodeId};

/// Set of known nodes with their advertised adjacencies.
///
/// Adjacency is expected to become symmetric once every node has been
/// heard from; transient asymmetry is tolerated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FabricGraph {
    nodes: BTreeMap<NodeId, FabricNode>,
}

impl FabricGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&FabricNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in identity order.
    pub fn nodes(&self) -> impl Iterator<Item = &FabricNode> {
        self.nodes.values()
    }

    /// Identities in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Find the node advertising `link_state_id`.
    pub fn find_by_link_state_id(&self, link_state_id: &LinkStateId) -> Option<&FabricNode> {
        self.nodes.values().find(|n| n.link_state_id() == link_state_id)
    }

    /// Insert or replace a node. Call [`FabricGraph::resolve`] afterwards.
    pub fn insert(&mut self, node: FabricNode) -> Option<FabricNode> {
        self.nodes.insert(node.id(), node)
    }

    /// Remove a node without touching other nodes' adjacencies.
    pub fn remove(&mut self, id: NodeId) -> Option<FabricNode> {
        self.nodes.remove(&id)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut FabricNode> {
        self.nodes.get_mut(&id)
    }

    /// Remove a node and scrub every reference to it from the other nodes.
    pub fn purge(&mut self, id: NodeId) -> Option<FabricNode> {
        let removed = self.nodes.remove(&id)?;
        for other in self.nodes.values_mut() {
            other.forget(id, removed.link_state_id());
        }
        Some(removed)
    }

    /// Resolve every adjacency against the current link-state id index.
    ///
    /// Returns how many adjacency entries changed resolution.
    pub fn resolve(&mut self) -> usize {
        let index: HashMap<LinkStateId, NodeId> = self
            .nodes
            .values()
            .map(|n| (n.link_state_id().clone(), n.id()))
            .collect();

        self.nodes
            .values_mut()
            .map(|n| n.resolve_with(|lsid| index.get(lsid).copied()))
            .sum()
    }

    /// Resolved neighbors of `id` that are present in the graph.
    pub fn neighbors_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(&id)
            .map(|n| n.resolved_neighbors().filter(|m| self.contains(*m)).collect())
            .unwrap_or_default()
    }

    /// Total number of adjacency entries still waiting for a neighbor.
    pub fn pending_count(&self) -> usize {
        self.nodes.values().map(FabricNode::pending_count).sum()
    }

    /// Directed links `a → b` with no matching `b → a`.
    pub fn asymmetric_links(&self) -> Vec<(NodeId, NodeId)> {
        let mut out = Vec::new();
        for node in self.nodes.values() {
            for neighbor in node.resolved_neighbors() {
                let mirrored = self
                    .nodes
                    .get(&neighbor)
                    .is_some_and(|n| n.has_neighbor(node.id()));
                if !mirrored {
                    out.push((node.id(), neighbor));
                }
            }
        }
        out
    }

    pub fn is_symmetric(&self) -> bool {
        self.asymmetric_links().is_empty()
    }
}
