//! Dense 0-based indexing over a graph snapshot.

use std::collections::{BTreeSet, HashMap};

use fabric_topology::{FabricGraph, NodeId};

/// Maps node identities to contiguous indices in identity order, together
/// with each node's resolved neighbor set in index space.
#[derive(Debug, Clone)]
pub(crate) struct DenseIndex {
    ids: Vec<NodeId>,
    neighbors: Vec<BTreeSet<usize>>,
}

impl DenseIndex {
    /// Only neighbors that are resolved and present in the graph contribute.
    pub(crate) fn build(graph: &FabricGraph) -> Self {
        let ids: Vec<NodeId> = graph.ids().collect();
        let position: HashMap<NodeId, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let neighbors = ids
            .iter()
            .map(|id| {
                graph
                    .neighbors_of(*id)
                    .into_iter()
                    .filter_map(|n| position.get(&n).copied())
                    .collect()
            })
            .collect();

        Self { ids, neighbors }
    }

    pub(crate) fn len(&self) -> usize {
        self.ids.len()
    }

    pub(crate) fn id(&self, index: usize) -> NodeId {
        self.ids[index]
    }

    pub(crate) fn neighbors(&self, index: usize) -> &BTreeSet<usize> {
        &self.neighbors[index]
    }

    /// Translate a set of indices back to identities (ascending).
    pub(crate) fn ids_of<'a, I>(&self, indices: I) -> Vec<NodeId>
    where
        I: IntoIterator<Item = &'a usize>,
    {
        indices.into_iter().map(|i| self.ids[*i]).collect()
    }
}
