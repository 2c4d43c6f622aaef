//! Fabric Roles
//!
//! Infers the tier of every node in a Clos fabric from the shape of the
//! link-state graph alone: no node is told what it is.
//!
//! # Approach
//!
//! 1. Snapshot the graph into a dense index (identity order)
//! 2. Group nodes with identical neighbor sets into equivalence classes
//! 3. Measure the hop count between every pair of classes
//! 4. A longest distance of four hops means several pods; anything shorter
//!    is a single pod
//!
//! See [`classify`] for the per-shape rules.

use std::collections::BTreeMap;
use std::fmt;

use fabric_topology::NodeId;

mod classes;
mod classify;
mod index;
mod paths;

pub use classes::EquivalenceClass;
pub use classify::{classify, classify_detailed};

/// Smallest topology that is classified at all.
pub const MIN_CLASSIFIABLE_NODES: usize = 3;

/// Hop distance between leaves of different pods.
pub const MULTI_POD_HOPS: u32 = 4;

/// Tier of a node in the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Role {
    Leaf,
    Spine,
    SuperSpine,
    BorderLeaf,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Leaf => "LEAF",
            Role::Spine => "SPINE",
            Role::SuperSpine => "SUPER-SPINE",
            Role::BorderLeaf => "BORDER-LEAF",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Output of one classification. Each list is ascending by identity and the
/// four lists are pairwise disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoleSets {
    pub leaves: Vec<NodeId>,
    pub spines: Vec<NodeId>,
    pub super_spines: Vec<NodeId>,
    pub borders: Vec<NodeId>,
}

impl RoleSets {
    /// True when nothing could be classified.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
            && self.spines.is_empty()
            && self.super_spines.is_empty()
            && self.borders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.leaves.len() + self.spines.len() + self.super_spines.len() + self.borders.len()
    }

    pub fn role_of(&self, node: NodeId) -> Option<Role> {
        self.iter().find(|(n, _)| *n == node).map(|(_, role)| role)
    }

    /// Every classified node, tier first.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Role)> + '_ {
        fn tier(nodes: &[NodeId], role: Role) -> impl Iterator<Item = (NodeId, Role)> + '_ {
            nodes.iter().map(move |n| (*n, role))
        }
        tier(&self.leaves, Role::Leaf)
            .chain(tier(&self.spines, Role::Spine))
            .chain(tier(&self.super_spines, Role::SuperSpine))
            .chain(tier(&self.borders, Role::BorderLeaf))
    }

    pub fn assignment(&self) -> BTreeMap<NodeId, Role> {
        self.iter().collect()
    }
}

/// Shape detected for the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FabricShape {
    /// Too small, or no connected class pair
    Undefined,
    SinglePod,
    MultiPod,
}

/// Roles plus the intermediate facts they were derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Classification {
    pub shape: FabricShape,
    pub roles: RoleSets,
    /// Equivalence classes in first-seen identity order
    pub classes: Vec<EquivalenceClass>,
    /// Longest finite hop count between two classes
    pub max_hops: Option<u32>,
}

impl Classification {
    pub(crate) fn undefined(classes: Vec<EquivalenceClass>, max_hops: Option<u32>) -> Self {
        Self {
            shape: FabricShape::Undefined,
            roles: RoleSets::default(),
            classes,
            max_hops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(n: u8) -> NodeId {
        format!("10.0.0.{}", n).parse().unwrap()
    }

    fn sample() -> RoleSets {
        RoleSets {
            leaves: vec![node(11), node(12)],
            spines: vec![node(1)],
            super_spines: vec![node(21)],
            borders: vec![node(31)],
        }
    }

    #[test]
    fn role_labels() {
        assert_eq!(Role::Leaf.to_string(), "LEAF");
        assert_eq!(Role::SuperSpine.to_string(), "SUPER-SPINE");
        assert_eq!(Role::BorderLeaf.label(), "BORDER-LEAF");
    }

    #[test]
    fn role_lookup() {
        let roles = sample();
        assert_eq!(roles.len(), 5);
        assert!(!roles.is_empty());
        assert_eq!(roles.role_of(node(12)), Some(Role::Leaf));
        assert_eq!(roles.role_of(node(21)), Some(Role::SuperSpine));
        assert_eq!(roles.role_of(node(99)), None);
    }

    #[test]
    fn assignment_is_keyed_by_identity() {
        let assignment = sample().assignment();
        let keys: Vec<_> = assignment.keys().copied().collect();
        assert_eq!(keys, vec![node(1), node(11), node(12), node(21), node(31)]);
        assert_eq!(assignment[&node(31)], Role::BorderLeaf);
    }

    #[test]
    fn default_is_empty() {
        assert!(RoleSets::default().is_empty());
        assert_eq!(RoleSets::default().len(), 0);
    }
}
