use crate::graph::{EdgeIndex, NodeIndex, Weight, WeightedGraph, UNREACHABLE};
use itertools::Itertools;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A path found by Dijkstra's algorithm.
#[derive(Clone, Debug, PartialEq)]
pub struct ShortestPath {
    /// From source to target, both inclusive.
    path: Vec<NodeIndex>,
    /// The edge taken for every hop, `edges[i]` connects `path[i]` and `path[i + 1]`.
    edges: Vec<EdgeIndex>,
    distance: Weight,
}

impl ShortestPath {
    pub fn new(path: Vec<NodeIndex>, edges: Vec<EdgeIndex>, distance: Weight) -> Self {
        debug_assert_eq!(path.len(), edges.len() + 1);
        Self {
            path,
            edges,
            distance,
        }
    }

    pub fn distance(&self) -> Weight {
        self.distance
    }

    pub fn path(&self) -> &[NodeIndex] {
        &self.path
    }

    pub fn edges(&self) -> &[EdgeIndex] {
        &self.edges
    }

    /// Consecutive node pairs along the path.
    pub fn hops(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.path.iter().copied().tuple_windows()
    }

    /// Whether source and target are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

impl PartialOrd for ShortestPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.distance().partial_cmp(&other.distance())
    }
}

/// Outgoing `(neighbor, edge, weight)` triples per node.
///
/// Built once per query so that relaxation does not have to scan all edges for every node
/// taken from the queue. Undirected edges are entered for both endpoints.
struct Adjacency {
    outgoing: Vec<Vec<(NodeIndex, EdgeIndex, Weight)>>,
}

impl Adjacency {
    fn new<N>(graph: &WeightedGraph<N>) -> Self {
        let mut outgoing = vec![vec![]; graph.node_count()];
        for (index, edge) in graph.edges() {
            outgoing[edge.i1].push((edge.i2, index, edge.weight));
            if !graph.is_directed() && edge.i1 != edge.i2 {
                outgoing[edge.i2].push((edge.i1, index, edge.weight));
            }
        }
        Self { outgoing }
    }
}

/// State of a single Dijkstra run, shared by the distance and path queries.
struct Dijkstra {
    adjacency: Adjacency,
    distances: Vec<Weight>,
    previous: Vec<Option<(NodeIndex, EdgeIndex)>>,
    visited: Vec<bool>,
    // ordered by (distance, node), the node only makes entries unique
    queue: BTreeSet<(OrderedFloat<Weight>, NodeIndex)>,
}

impl Dijkstra {
    fn new<N>(graph: &WeightedGraph<N>, source: NodeIndex) -> Self {
        let n = graph.node_count();
        let mut distances = vec![UNREACHABLE; n];
        distances[source] = 0.0;
        let mut queue = BTreeSet::new();
        queue.insert((OrderedFloat(0.0), source));
        Self {
            adjacency: Adjacency::new(graph),
            distances,
            previous: vec![None; n],
            visited: vec![false; n],
            queue,
        }
    }

    /// Run until `target` is taken from the queue or the queue is exhausted.
    /// Returns whether `target` was reached.
    fn run(&mut self, target: Option<NodeIndex>) -> bool {
        while let Some((OrderedFloat(distance), current)) = self.queue.pop_first() {
            if Some(current) == target {
                return true;
            }
            self.visited[current] = true;
            for &(neighbor, edge, weight) in &self.adjacency.outgoing[current] {
                if self.visited[neighbor] {
                    continue;
                }
                let tentative = distance + weight;
                if tentative < self.distances[neighbor] {
                    self.queue
                        .remove(&(OrderedFloat(self.distances[neighbor]), neighbor));
                    self.distances[neighbor] = tentative;
                    self.previous[neighbor] = Some((current, edge));
                    self.queue.insert((OrderedFloat(tentative), neighbor));
                }
            }
        }
        false
    }

    fn path_to(&self, target: NodeIndex) -> ShortestPath {
        let mut path = vec![target];
        let mut edges = vec![];
        let mut current = target;
        while let Some((previous, edge)) = self.previous[current] {
            path.push(previous);
            edges.push(edge);
            current = previous;
        }
        path.reverse();
        edges.reverse();
        ShortestPath::new(path, edges, self.distances[target])
    }
}

/// Dijkstra's algorithm. Edge weights must not be negative.
impl<N> WeightedGraph<N> {
    /// Length of the shortest path from `source` to `target`, or [UNREACHABLE].
    ///
    /// # Panics
    /// If `source` or `target` is out of range.
    pub fn dijkstra_distance(&self, source: NodeIndex, target: NodeIndex) -> Weight {
        assert!(target < self.node_count(), "target {} out of range", target);
        if self.node(source).is_none() || self.node(target).is_none() {
            return UNREACHABLE;
        }
        let mut dijkstra = Dijkstra::new(self, source);
        if dijkstra.run(Some(target)) {
            dijkstra.distances[target]
        } else {
            UNREACHABLE
        }
    }

    /// Shortest distances from `source` to every node slot. Unreachable nodes and tombstones
    /// are [UNREACHABLE].
    ///
    /// # Panics
    /// If `source` is out of range.
    pub fn dijkstra_distances(&self, source: NodeIndex) -> Vec<Weight> {
        if self.node(source).is_none() {
            return vec![UNREACHABLE; self.node_count()];
        }
        let mut dijkstra = Dijkstra::new(self, source);
        dijkstra.run(None);
        dijkstra.distances
    }

    /// Shortest path from `source` to `target`, `None` if there is none.
    ///
    /// # Panics
    /// If `source` or `target` is out of range.
    pub fn dijkstra_shortest_path(
        &self,
        source: NodeIndex,
        target: NodeIndex,
    ) -> Option<ShortestPath> {
        assert!(target < self.node_count(), "target {} out of range", target);
        if self.node(source).is_none() || self.node(target).is_none() {
            return None;
        }
        let mut dijkstra = Dijkstra::new(self, source);
        if dijkstra.run(Some(target)) {
            Some(dijkstra.path_to(target))
        } else {
            None
        }
    }
}
