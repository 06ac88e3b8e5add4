//! Minimum spanning trees via Kruskal's algorithm.

use crate::graph::{NodeIndex, WeightedGraph};
use itertools::Itertools;
use ordered_float::OrderedFloat;

/// Disjoint sets over `0..n` with path compression.
///
/// There is no union by rank: the graphs this is used on are small enough that the
/// compression alone keeps the trees flat.
#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<NodeIndex>,
}

impl UnionFind {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub fn find(&mut self, x: NodeIndex) -> NodeIndex {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Merge the sets containing `x` and `y`. Returns `false` if they already were one set.
    pub fn union(&mut self, x: NodeIndex, y: NodeIndex) -> bool {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return false;
        }
        self.parent[root_y] = root_x;
        true
    }
}

impl<N: Clone> WeightedGraph<N> {
    /// Kruskal's algorithm.
    ///
    /// The result is always undirected and contains a copy of every live node of `self`. As long
    /// as `self` has no tombstones, node `i` of the result is node `i` of `self`. Disconnected
    /// inputs give a spanning forest.
    pub fn find_minimum_spanning_tree_kruskal(&self) -> WeightedGraph<N> {
        let mut tree = WeightedGraph::new(false);
        let map = tree.copy_nodes_from(self);
        let mut components = UnionFind::new(tree.node_count());
        // stable sort: equal weights keep insertion order
        let edges = self
            .edges()
            .map(|(_, edge)| *edge)
            .sorted_by_key(|edge| OrderedFloat(edge.weight));
        for edge in edges {
            let (Some(i1), Some(i2)) = (map.get(edge.i1), map.get(edge.i2)) else {
                continue;
            };
            if components.union(i1, i2) {
                tree.add_edge(i1, i2, edge.weight);
            }
        }
        tree
    }
}
