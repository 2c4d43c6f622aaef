//! A single node in the link-state view.

use std::collections::HashSet;

use crate::{LinkStateId, NodeId};

/// One advertised adjacency: the neighbor's link-state id, plus its identity
/// once that neighbor has been seen in the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjacency {
    /// Link-state id advertised for the neighbor
    pub link_state_id: LinkStateId,
    /// Neighbor identity, `None` while the neighbor is unknown
    pub resolved: Option<NodeId>,
}

impl Adjacency {
    fn pending(link_state_id: LinkStateId) -> Self {
        Self {
            link_state_id,
            resolved: None,
        }
    }
}

/// A fabric node and its directly-connected neighbors.
///
/// Neighbor ids and neighbor identities live in the same [`Adjacency`] entry,
/// so the two lists can never drift apart in length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FabricNode {
    id: NodeId,
    link_state_id: LinkStateId,
    adjacencies: Vec<Adjacency>,
}

impl FabricNode {
    /// Create a node with unresolved neighbors.
    ///
    /// Duplicate neighbor ids are collapsed (first occurrence wins) and a
    /// reference to the node's own link-state id is dropped.
    pub fn new<I>(id: NodeId, link_state_id: LinkStateId, neighbor_ids: I) -> Self
    where
        I: IntoIterator<Item = LinkStateId>,
    {
        let mut node = Self {
            id,
            link_state_id,
            adjacencies: Vec::new(),
        };
        node.replace_neighbor_ids(neighbor_ids);
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn link_state_id(&self) -> &LinkStateId {
        &self.link_state_id
    }

    pub fn adjacencies(&self) -> &[Adjacency] {
        &self.adjacencies
    }

    /// Advertised neighbor link-state ids, in advertisement order.
    pub fn neighbor_ids(&self) -> impl Iterator<Item = &LinkStateId> {
        self.adjacencies.iter().map(|a| &a.link_state_id)
    }

    /// Identities of the neighbors resolved so far.
    pub fn resolved_neighbors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adjacencies.iter().filter_map(|a| a.resolved)
    }

    /// Number of neighbor references still waiting for their node.
    pub fn pending_count(&self) -> usize {
        self.adjacencies.iter().filter(|a| a.resolved.is_none()).count()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.pending_count() == 0
    }

    pub fn has_neighbor(&self, other: NodeId) -> bool {
        self.adjacencies.iter().any(|a| a.resolved == Some(other))
    }

    /// Replace the whole neighbor list. Every entry starts unresolved.
    pub(crate) fn replace_neighbor_ids<I>(&mut self, neighbor_ids: I)
    where
        I: IntoIterator<Item = LinkStateId>,
    {
        let mut seen = HashSet::new();
        self.adjacencies = neighbor_ids
            .into_iter()
            .filter(|lsid| *lsid != self.link_state_id)
            .filter(|lsid| seen.insert(lsid.clone()))
            .map(Adjacency::pending)
            .collect();
    }

    /// Re-resolve every adjacency through `lookup`.
    ///
    /// Returns how many entries changed.
    pub(crate) fn resolve_with<F>(&mut self, lookup: F) -> usize
    where
        F: Fn(&LinkStateId) -> Option<NodeId>,
    {
        let own = self.id;
        let mut changed = 0;
        for adjacency in &mut self.adjacencies {
            let resolved = lookup(&adjacency.link_state_id).filter(|n| *n != own);
            if resolved != adjacency.resolved {
                adjacency.resolved = resolved;
                changed += 1;
            }
        }
        changed
    }

    /// Drop every adjacency pointing at `id` or `link_state_id`.
    ///
    /// Returns true if anything was removed.
    pub(crate) fn forget(&mut self, id: NodeId, link_state_id: &LinkStateId) -> bool {
        let before = self.adjacencies.len();
        self.adjacencies
            .retain(|a| a.link_state_id != *link_state_id && a.resolved != Some(id));
        self.adjacencies.len() != before
    }
}
