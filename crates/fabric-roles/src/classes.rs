//! Equivalence classes: nodes with identical neighbor sets.
//!
//! In a Clos fabric every leaf of a fully wired pod sees the same spines and
//! every spine sees the same leaves, so the classes are a structural
//! fingerprint of the tiers.

use std::collections::BTreeSet;

use fabric_topology::NodeId;

use crate::index::DenseIndex;

/// Class in index space. `members` is never empty and ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Class {
    pub(crate) members: Vec<usize>,
    pub(crate) neighbors: BTreeSet<usize>,
}

impl Class {
    /// Node used as the class representative in hop-count queries.
    pub(crate) fn representative(&self) -> usize {
        self.members[0]
    }

    /// Classes without neighbors cannot be paired with anything.
    pub(crate) fn is_isolated(&self) -> bool {
        self.neighbors.is_empty()
    }
}

/// Group nodes by set-equal neighbor sets, in first-seen index order.
pub(crate) fn build_classes(index: &DenseIndex) -> Vec<Class> {
    let mut classes: Vec<Class> = Vec::new();
    for node in 0..index.len() {
        let neighbors = index.neighbors(node);
        match classes.iter_mut().find(|c| c.neighbors == *neighbors) {
            Some(class) => class.members.push(node),
            None => classes.push(Class {
                members: vec![node],
                neighbors: neighbors.clone(),
            }),
        }
    }
    classes
}

/// An equivalence class expressed in node identities.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquivalenceClass {
    /// Nodes sharing the neighbor set, ascending
    pub members: Vec<NodeId>,
    /// The shared neighbor set, ascending
    pub neighbors: Vec<NodeId>,
}

impl EquivalenceClass {
    pub(crate) fn from_class(class: &Class, index: &DenseIndex) -> Self {
        Self {
            members: index.ids_of(&class.members),
            neighbors: index.ids_of(&class.neighbors),
        }
    }
}
