//! Hop counts between equivalence classes.
//!
//! Costs live in a dense matrix: 1 between connected nodes, infinity
//! (`None`) otherwise. Shortest paths use a label-setting search that starts
//! once from each class representative and settles every reachable node, so
//! all pair distances from that class come out of a single pass.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::classes::Class;
use crate::index::DenseIndex;

/// Dense n×n link cost matrix plus the adjacency lists it was built from.
#[derive(Debug, Clone)]
pub(crate) struct CostMatrix {
    size: usize,
    costs: Vec<Option<u32>>,
    adjacency: Vec<Vec<usize>>,
}

impl CostMatrix {
    pub(crate) fn from_index(index: &DenseIndex) -> Self {
        let size = index.len();
        let mut costs = vec![None; size * size];
        let mut adjacency = Vec::with_capacity(size);
        for from in 0..size {
            let row: Vec<usize> = index.neighbors(from).iter().copied().collect();
            for &to in &row {
                costs[from * size + to] = Some(1);
            }
            adjacency.push(row);
        }
        Self {
            size,
            costs,
            adjacency,
        }
    }

    pub(crate) fn cost(&self, from: usize, to: usize) -> Option<u32> {
        self.costs[from * self.size + to]
    }

    /// Minimum hop count from `source` to every node; `None` when unreachable.
    pub(crate) fn hop_counts_from(&self, source: usize) -> Vec<Option<u32>> {
        let mut labels: Vec<Option<u32>> = vec![None; self.size];
        let mut settled = vec![false; self.size];
        let mut frontier = BinaryHeap::new();

        labels[source] = Some(0);
        frontier.push(Reverse((0u32, source)));

        while let Some(Reverse((label, node))) = frontier.pop() {
            if settled[node] {
                continue;
            }
            settled[node] = true;
            for &next in &self.adjacency[node] {
                if settled[next] {
                    continue;
                }
                let Some(cost) = self.cost(node, next) else {
                    continue;
                };
                let candidate = label + cost;
                if labels[next].map_or(true, |current| candidate < current) {
                    labels[next] = Some(candidate);
                    frontier.push(Reverse((candidate, next)));
                }
            }
        }
        labels
    }

    /// Minimum hop count from `source` to `target`; `None` when unreachable.
    #[cfg(test)]
    pub(crate) fn hop_count(&self, source: usize, target: usize) -> Option<u32> {
        self.hop_counts_from(source)[target]
    }
}

/// Finite hop count between two classes (indices into the class list).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClassPair {
    pub(crate) a: usize,
    pub(crate) b: usize,
    pub(crate) hops: u32,
}

/// Hop counts for every pair of non-isolated classes, `a < b`.
///
/// Unreachable pairs are skipped rather than reported.
pub(crate) fn class_pairs(classes: &[Class], matrix: &CostMatrix) -> Vec<ClassPair> {
    let mut pairs = Vec::new();
    for a in 0..classes.len() {
        if classes[a].is_isolated() {
            continue;
        }
        let labels = matrix.hop_counts_from(classes[a].representative());
        for b in (a + 1)..classes.len() {
            if classes[b].is_isolated() {
                continue;
            }
            if let Some(hops) = labels[classes[b].representative()] {
                pairs.push(ClassPair { a, b, hops });
            }
        }
    }
    pairs
}

/// Distinct classes appearing in pairs at exactly `hops`, in order of
/// first appearance.
pub(crate) fn classes_at_distance(pairs: &[ClassPair], hops: u32) -> Vec<usize> {
    let mut out = Vec::new();
    for pair in pairs.iter().filter(|p| p.hops == hops) {
        for class in [pair.a, pair.b] {
            if !out.contains(&class) {
                out.push(class);
            }
        }
    }
    out
}
