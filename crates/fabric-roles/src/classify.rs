//! Fabric shape detection and role assignment.
//!
//! # Single pod
//!
//! Leaves and spines are one hop apart. Among classes taking part in a
//! one-hop pair, the spine class is the one with no more members than
//! neighbors and the most neighbors (ties go to the lowest member identity).
//! Spines wired to only part of the leaves form their own class whose
//! neighbor set is contained in the full spine class's; they are folded in.
//!
//! # Multi pod
//!
//! Leaves of different pods are exactly four hops apart
//! (leaf → spine → super-spine → spine → leaf). Those classes become leaf
//! groups, merged when one group's spines are a subset of another's so that
//! partially wired leaves join their pod. Group neighbors are spines, the
//! spines' other neighbors are super-spines, and whatever is left over is a
//! border leaf.

use std::collections::BTreeSet;

use fabric_topology::FabricGraph;

use crate::classes::{build_classes, Class, EquivalenceClass};
use crate::index::DenseIndex;
use crate::paths::{class_pairs, classes_at_distance, ClassPair, CostMatrix};
use crate::{Classification, FabricShape, RoleSets, MIN_CLASSIFIABLE_NODES, MULTI_POD_HOPS};

/// Classify every node of the graph.
///
/// Returns four empty sets when the topology is too small or has no
/// connected class pair.
pub fn classify(graph: &FabricGraph) -> RoleSets {
    classify_detailed(graph).roles
}

/// Like [`classify`], also reporting the detected shape and the classes.
pub fn classify_detailed(graph: &FabricGraph) -> Classification {
    if graph.len() < MIN_CLASSIFIABLE_NODES {
        return Classification::undefined(Vec::new(), None);
    }

    let index = DenseIndex::build(graph);
    let classes = build_classes(&index);
    let matrix = CostMatrix::from_index(&index);
    let pairs = class_pairs(&classes, &matrix);

    let public_classes = classes
        .iter()
        .map(|c| EquivalenceClass::from_class(c, &index))
        .collect();

    let Some(max_hops) = pairs.iter().map(|p| p.hops).max() else {
        return Classification::undefined(public_classes, None);
    };

    if max_hops < MULTI_POD_HOPS {
        let assignment = single_pod(&index, &classes, &pairs, max_hops);
        return Classification {
            shape: FabricShape::SinglePod,
            roles: assignment.into_roles(&index),
            classes: public_classes,
            max_hops: Some(max_hops),
        };
    }

    match multi_pod(&index, &classes, &pairs) {
        Some(assignment) => Classification {
            shape: FabricShape::MultiPod,
            roles: assignment.into_roles(&index),
            classes: public_classes,
            max_hops: Some(max_hops),
        },
        None => Classification::undefined(public_classes, Some(max_hops)),
    }
}

/// Role sets in index space.
#[derive(Debug, Default)]
struct Assignment {
    leaves: BTreeSet<usize>,
    spines: BTreeSet<usize>,
    super_spines: BTreeSet<usize>,
    borders: BTreeSet<usize>,
}

impl Assignment {
    fn is_classified(&self, node: usize) -> bool {
        self.leaves.contains(&node)
            || self.spines.contains(&node)
            || self.super_spines.contains(&node)
    }

    fn into_roles(self, index: &DenseIndex) -> RoleSets {
        RoleSets {
            leaves: index.ids_of(&self.leaves),
            spines: index.ids_of(&self.spines),
            super_spines: index.ids_of(&self.super_spines),
            borders: index.ids_of(&self.borders),
        }
    }
}

fn single_pod(
    index: &DenseIndex,
    classes: &[Class],
    pairs: &[ClassPair],
    max_hops: u32,
) -> Assignment {
    let adjacent = classes_at_distance(pairs, 1);

    let spine_class = adjacent
        .iter()
        .copied()
        .filter(|&c| classes[c].members.len() <= classes[c].neighbors.len())
        .max_by(|&a, &b| {
            classes[a]
                .neighbors
                .len()
                .cmp(&classes[b].neighbors.len())
                .then_with(|| classes[b].representative().cmp(&classes[a].representative()))
        });

    let mut assignment = Assignment::default();
    if let Some(spine_class) = spine_class {
        let spine = &classes[spine_class];
        assignment.spines.extend(spine.members.iter().copied());

        // Incompletely wired spines see a subset of the full spines' leaves.
        if max_hops > 1 {
            for (k, class) in classes.iter().enumerate() {
                if k == spine_class || class.is_isolated() {
                    continue;
                }
                let overlaps = !class.neighbors.is_disjoint(&spine.neighbors);
                if overlaps && class.neighbors.is_subset(&spine.neighbors) {
                    assignment.spines.extend(class.members.iter().copied());
                }
            }
        }
    }

    assignment.leaves = (0..index.len()).filter(|n| !assignment.spines.contains(n)).collect();
    assignment
}

/// Leaf group of one pod: its leaves and the spines they reach.
#[derive(Debug, Clone)]
struct LeafGroup {
    members: BTreeSet<usize>,
    neighbors: BTreeSet<usize>,
}

fn multi_pod(index: &DenseIndex, classes: &[Class], pairs: &[ClassPair]) -> Option<Assignment> {
    let far = classes_at_distance(pairs, MULTI_POD_HOPS);
    if far.is_empty() {
        return None;
    }

    let mut groups: Vec<Option<LeafGroup>> = far
        .iter()
        .map(|&c| {
            Some(LeafGroup {
                members: classes[c].members.iter().copied().collect(),
                neighbors: classes[c].neighbors.clone(),
            })
        })
        .collect();

    // Partially wired leaves reach a subset of their pod's spines.
    for i in 0..groups.len() {
        for j in 0..groups.len() {
            if i == j {
                continue;
            }
            let absorbs = match (&groups[i], &groups[j]) {
                (Some(gi), Some(gj)) => {
                    !gi.neighbors.is_disjoint(&gj.neighbors)
                        && gi.neighbors.len() <= gj.neighbors.len()
                        && gi.neighbors.is_subset(&gj.neighbors)
                }
                _ => false,
            };
            if !absorbs {
                continue;
            }
            if let Some(absorbed) = groups[j].take() {
                if let Some(gi) = groups[i].as_mut() {
                    gi.members.extend(absorbed.members);
                    gi.neighbors.extend(absorbed.neighbors);
                }
            }
        }
    }
    let groups: Vec<LeafGroup> = groups.into_iter().flatten().collect();

    let mut assignment = Assignment::default();
    for group in &groups {
        assignment.leaves.extend(group.members.iter().copied());
    }
    for group in &groups {
        let spines: Vec<usize> = group
            .neighbors
            .iter()
            .copied()
            .filter(|n| !assignment.leaves.contains(n))
            .collect();
        assignment.spines.extend(spines);
    }
    for group in &groups {
        let reaches_group = |c: &&Class| c.members.iter().any(|m| group.neighbors.contains(m));
        for class in classes.iter().filter(reaches_group) {
            let found: Vec<usize> = class
                .neighbors
                .iter()
                .copied()
                .filter(|n| !group.members.contains(n) && !assignment.is_classified(*n))
                .collect();
            assignment.super_spines.extend(found);
        }
    }
    assignment.borders = (0..index.len()).filter(|n| !assignment.is_classified(*n)).collect();

    Some(assignment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabric_topology::{FabricNode, LinkStateId, NodeId};
    use proptest::prelude::*;

    fn node(n: u8) -> NodeId {
        format!("10.0.0.{}", n).parse().unwrap()
    }

    fn nodes(ns: &[u8]) -> Vec<NodeId> {
        ns.iter().map(|n| node(*n)).collect()
    }

    fn lsid(n: u8) -> LinkStateId {
        format!("49.0001.0000.0000.{:04x}.00", n).parse().unwrap()
    }

    /// Build a symmetric graph from an undirected edge list.
    fn fabric(edges: &[(u8, u8)]) -> FabricGraph {
        let mut ids: BTreeSet<u8> = BTreeSet::new();
        for (a, b) in edges {
            ids.insert(*a);
            ids.insert(*b);
        }
        let mut g = FabricGraph::new();
        for id in ids {
            let neighbors = edges.iter().filter_map(|(a, b)| {
                if *a == id {
                    Some(lsid(*b))
                } else if *b == id {
                    Some(lsid(*a))
                } else {
                    None
                }
            });
            g.insert(FabricNode::new(node(id), lsid(id), neighbors));
        }
        g.resolve();
        g
    }

    fn full_mesh(left: &[u8], right: &[u8]) -> Vec<(u8, u8)> {
        left.iter().flat_map(|a| right.iter().map(move |b| (*a, *b))).collect()
    }

    /// Leaves 11-14, spines 1-2.
    fn single_pod_fabric() -> FabricGraph {
        fabric(&full_mesh(&[1, 2], &[11, 12, 13, 14]))
    }

    /// Pod A: leaves 11-12, spines 1-2. Pod B: leaves 13-14, spines 3-4.
    /// Super-spines 21-22 reach every spine.
    fn multi_pod_edges() -> Vec<(u8, u8)> {
        let mut edges = full_mesh(&[1, 2], &[11, 12]);
        edges.extend(full_mesh(&[3, 4], &[13, 14]));
        edges.extend(full_mesh(&[21, 22], &[1, 2, 3, 4]));
        edges
    }

    #[test]
    fn fewer_than_three_nodes_is_undefined() {
        assert!(classify(&FabricGraph::new()).is_empty());
        assert!(classify(&fabric(&[])).is_empty());

        let mut one = FabricGraph::new();
        one.insert(FabricNode::new(node(1), lsid(1), Vec::new()));
        assert!(classify(&one).is_empty());

        let two = fabric(&[(1, 2)]);
        let result = classify_detailed(&two);
        assert_eq!(result.shape, FabricShape::Undefined);
        assert!(result.roles.is_empty());
    }

    #[test]
    fn no_links_is_undefined() {
        let mut g = FabricGraph::new();
        for n in 1..=4 {
            g.insert(FabricNode::new(node(n), lsid(n), Vec::new()));
        }
        g.resolve();
        let result = classify_detailed(&g);
        assert_eq!(result.shape, FabricShape::Undefined);
        assert!(result.roles.is_empty());
        assert_eq!(result.max_hops, None);
    }

    #[test]
    fn single_pod_scenario() {
        let result = classify_detailed(&single_pod_fabric());

        assert_eq!(result.shape, FabricShape::SinglePod);
        assert_eq!(result.roles.leaves, nodes(&[11, 12, 13, 14]));
        assert_eq!(result.roles.spines, nodes(&[1, 2]));
        assert!(result.roles.super_spines.is_empty());
        assert!(result.roles.borders.is_empty());
        assert_eq!(result.classes.len(), 2);
    }

    #[test]
    fn single_pod_folds_in_partial_spine() {
        // Spine 2 misses leaf 14.
        let mut edges = full_mesh(&[1], &[11, 12, 13, 14]);
        edges.extend(full_mesh(&[2], &[11, 12, 13]));
        let roles = classify(&fabric(&edges));

        assert_eq!(roles.spines, nodes(&[1, 2]));
        assert_eq!(roles.leaves, nodes(&[11, 12, 13, 14]));
    }

    #[test]
    fn single_pod_spine_tie_goes_to_lowest_identity() {
        // Two leaves, two spines: both classes have 2 members and 2 neighbors.
        let roles = classify(&fabric(&full_mesh(&[5, 6], &[7, 8])));
        assert_eq!(roles.spines, nodes(&[5, 6]));
        assert_eq!(roles.leaves, nodes(&[7, 8]));

        let roles = classify(&fabric(&full_mesh(&[7, 8], &[5, 6])));
        assert_eq!(roles.spines, nodes(&[5, 6]));
    }

    #[test]
    fn multi_pod_scenario() {
        let g = fabric(&multi_pod_edges());
        let result = classify_detailed(&g);

        assert_eq!(result.shape, FabricShape::MultiPod);
        assert_eq!(result.max_hops, Some(4));
        assert_eq!(result.roles.leaves, nodes(&[11, 12, 13, 14]));
        assert_eq!(result.roles.spines, nodes(&[1, 2, 3, 4]));
        assert_eq!(result.roles.super_spines, nodes(&[21, 22]));
        assert!(result.roles.borders.is_empty());
    }

    #[test]
    fn multi_pod_hop_counts() {
        let g = fabric(&multi_pod_edges());
        let index = DenseIndex::build(&g);
        let matrix = CostMatrix::from_index(&index);
        let at = |n: u8| g.ids().position(|id| id == node(n)).unwrap();

        assert_eq!(matrix.hop_count(at(11), at(13)), Some(4));
        assert_eq!(matrix.hop_count(at(11), at(12)), Some(2));
        assert_eq!(matrix.hop_count(at(13), at(14)), Some(2));
    }

    #[test]
    fn multi_pod_absorbs_partially_wired_leaf() {
        // Leaf 12 only reaches spine 1 in pod A.
        let mut edges = full_mesh(&[1, 2], &[11]);
        edges.push((1, 12));
        edges.extend(full_mesh(&[3, 4], &[13, 14]));
        edges.extend(full_mesh(&[21, 22], &[1, 2, 3, 4]));
        let roles = classify(&fabric(&edges));

        assert_eq!(roles.leaves, nodes(&[11, 12, 13, 14]));
        assert_eq!(roles.spines, nodes(&[1, 2, 3, 4]));
        assert_eq!(roles.super_spines, nodes(&[21, 22]));
        assert!(roles.borders.is_empty());
    }

    #[test]
    fn border_leaves_hang_off_super_spines() {
        let mut edges = multi_pod_edges();
        edges.extend(full_mesh(&[21, 22], &[31, 32]));
        let roles = classify(&fabric(&edges));

        assert_eq!(roles.leaves, nodes(&[11, 12, 13, 14]));
        assert_eq!(roles.spines, nodes(&[1, 2, 3, 4]));
        assert_eq!(roles.super_spines, nodes(&[21, 22]));
        assert_eq!(roles.borders, nodes(&[31, 32]));
    }

    #[test]
    fn unresolved_neighbors_do_not_count() {
        let mut g = single_pod_fabric();
        // Leaf 15 advertises a neighbor that never shows up, and spine 1.
        g.insert(FabricNode::new(node(15), lsid(15), vec![lsid(1), lsid(99)]));
        g.resolve();
        let roles = classify(&g);
        assert!(roles.leaves.contains(&node(15)));
        assert_eq!(roles.len(), 7);
    }

    #[test]
    fn disconnected_pieces_are_not_misclassified() {
        // A single pod plus an isolated node: the isolated node never pairs,
        // so it ends up as a leaf of the one-pod layout rather than a spine.
        let mut g = single_pod_fabric();
        g.insert(FabricNode::new(node(50), lsid(50), Vec::new()));
        g.resolve();
        let roles = classify(&g);
        assert_eq!(roles.spines, nodes(&[1, 2]));
        assert!(roles.super_spines.is_empty());
    }

    #[test]
    fn classification_is_idempotent() {
        let g = fabric(&multi_pod_edges());
        assert_eq!(classify(&g), classify(&g));
    }

    proptest! {
        #[test]
        fn output_is_a_partition(bits in prop::collection::vec(any::<bool>(), 28)) {
            // Random graph over 8 nodes.
            let mut edges = Vec::new();
            let mut k = 0;
            for a in 1..=8u8 {
                for b in (a + 1)..=8u8 {
                    if bits[k] {
                        edges.push((a, b));
                    }
                    k += 1;
                }
            }
            let g = fabric(&edges);
            let roles = classify(&g);
            prop_assert_eq!(&roles, &classify(&g));
            if !roles.is_empty() {
                let all: BTreeSet<NodeId> = roles.iter().map(|(n, _)| n).collect();
                prop_assert_eq!(all.len(), roles.len());
                prop_assert_eq!(roles.len(), g.len());
            }
        }
    }
}
