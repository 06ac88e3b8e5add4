use itertools::Itertools;
use std::collections::VecDeque;

pub type NodeIndex = usize;
pub type EdgeIndex = usize;
pub type Weight = f32;

/// Distance reported for targets that cannot be reached from the source.
pub const UNREACHABLE: Weight = Weight::MAX;

/// Weight used by callers that have no better value for an edge.
pub const DEFAULT_WEIGHT: Weight = 1.0;

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Edge {
    pub i1: NodeIndex,
    pub i2: NodeIndex,
    pub weight: Weight,
}

impl Edge {
    pub fn new(i1: NodeIndex, i2: NodeIndex, weight: Weight) -> Self {
        Self { i1, i2, weight }
    }

    pub fn touches(&self, node: NodeIndex) -> bool {
        self.i1 == node || self.i2 == node
    }

    /// The endpoint opposite to `node`. `node` must be one of the endpoints.
    pub fn other(&self, node: NodeIndex) -> NodeIndex {
        if self.i1 == node {
            self.i2
        } else {
            self.i1
        }
    }

    fn connects(&self, i1: NodeIndex, i2: NodeIndex, directed: bool) -> bool {
        (self.i1 == i1 && self.i2 == i2) || (!directed && self.i1 == i2 && self.i2 == i1)
    }
}

/// Translation table from the node indices of one graph into those of another.
///
/// Every step that moves nodes between graphs hands one of these to the next step
/// instead of relying on positional correspondence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexMap {
    targets: Vec<Option<NodeIndex>>,
}

impl IndexMap {
    /// Map `0..n` onto the given targets in order.
    pub fn from_targets<I: IntoIterator<Item = NodeIndex>>(targets: I) -> Self {
        Self {
            targets: targets.into_iter().map(Some).collect(),
        }
    }

    fn with_len(len: usize) -> Self {
        Self {
            targets: vec![None; len],
        }
    }

    fn insert(&mut self, from: NodeIndex, to: NodeIndex) {
        self.targets[from] = Some(to);
    }

    /// Target of `from`, or `None` if `from` has no counterpart (e.g. it was a tombstone).
    pub fn get(&self, from: NodeIndex) -> Option<NodeIndex> {
        self.targets.get(from).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_identity(&self) -> bool {
        self.targets
            .iter()
            .enumerate()
            .all(|(from, to)| *to == Some(from))
    }
}

/// A mutable weighted graph over arbitrary node payloads.
///
/// Nodes and edges live in sparse slot vectors: a `None` slot is a tombstone left behind by
/// [WeightedGraph::set_node_to_null]. Tombstones keep every other index valid and are skipped
/// by all iteration and lookup, but still count towards [WeightedGraph::node_count] and
/// [WeightedGraph::edge_count]. [WeightedGraph::remove_node] is the compacting alternative,
/// which shifts all higher node indices down by one.
#[derive(Clone, PartialEq, Debug)]
pub struct WeightedGraph<N> {
    directed: bool,
    nodes: Vec<Option<N>>,
    edges: Vec<Option<Edge>>,
}

impl<N> Default for WeightedGraph<N> {
    fn default() -> Self {
        Self::new(false)
    }
}

impl<N> WeightedGraph<N> {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            nodes: vec![],
            edges: vec![],
        }
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of node slots, tombstones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edge slots, tombstones included.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn live_node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn live_edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    /// Payload of a node, `None` for a tombstone.
    ///
    /// # Panics
    /// If `index` is out of range.
    pub fn node(&self, index: NodeIndex) -> Option<&N> {
        self.nodes[index].as_ref()
    }

    /// # Panics
    /// If `index` is out of range.
    pub fn edge(&self, index: EdgeIndex) -> Option<&Edge> {
        self.edges[index].as_ref()
    }

    /// Iterator over the live nodes and their indices.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &N)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.as_ref().map(|node| (index, node)))
    }

    /// Iterator over the live edges and their indices.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, &Edge)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| edge.as_ref().map(|edge| (index, edge)))
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.nodes().map(|(index, _)| index)
    }

    /// Insert a node, reusing the first tombstoned slot if there is one.
    /// Payloads are not deduplicated, see [WeightedGraph::find_or_add_node] for that.
    pub fn add_node(&mut self, node: N) -> NodeIndex {
        match self.nodes.iter().position(Option::is_none) {
            Some(free) => {
                self.nodes[free] = Some(node);
                free
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    /// Insert an edge between two existing nodes and return its index.
    ///
    /// If the nodes are already connected (in either direction for undirected graphs) the
    /// existing index is returned and its weight is left as it was: the first weight wins.
    ///
    /// # Panics
    /// If either node index is out of range or a tombstone.
    pub fn add_edge(&mut self, i1: NodeIndex, i2: NodeIndex, weight: Weight) -> EdgeIndex {
        for node in [i1, i2] {
            self.check_index(node);
            assert!(
                self.nodes[node].is_some(),
                "edge ({}, {}) refers to deleted node {}",
                i1,
                i2,
                node
            );
        }
        if let Some(existing) = self.find_edge(i1, i2) {
            return existing;
        }
        let edge = Some(Edge::new(i1, i2, weight));
        match self.edges.iter().position(Option::is_none) {
            Some(free) => {
                self.edges[free] = edge;
                free
            }
            None => {
                self.edges.push(edge);
                self.edges.len() - 1
            }
        }
    }

    pub fn find_edge(&self, i1: NodeIndex, i2: NodeIndex) -> Option<EdgeIndex> {
        self.edges()
            .find(|(_, edge)| edge.connects(i1, i2, self.directed))
            .map(|(index, _)| index)
    }

    /// Weight of the edge [WeightedGraph::find_edge] returns for `(i1, i2)`.
    pub fn weight(&self, i1: NodeIndex, i2: NodeIndex) -> Option<Weight> {
        self.find_edge(i1, i2)
            .and_then(|index| self.edge(index))
            .map(|edge| edge.weight)
    }

    pub fn total_weight(&self) -> Weight {
        self.edges().map(|(_, edge)| edge.weight).sum()
    }

    fn check_index(&self, node: NodeIndex) {
        assert!(
            node < self.nodes.len(),
            "node {} is outside of 0..{}",
            node,
            self.nodes.len()
        );
    }

    /// Number of edges touching `node`. For directed graphs this is in-degree plus out-degree.
    ///
    /// # Panics
    /// If `node` is out of range. This holds for the other degree and neighbour queries too.
    pub fn degree(&self, node: NodeIndex) -> usize {
        self.check_index(node);
        if self.directed {
            self.in_degree(node) + self.out_degree(node)
        } else {
            self.edges().filter(|(_, edge)| edge.touches(node)).count()
        }
    }

    /// Edges ending in `node`. Undirected graphs have no direction, so this equals the degree.
    pub fn in_degree(&self, node: NodeIndex) -> usize {
        self.check_index(node);
        if self.directed {
            self.edges().filter(|(_, edge)| edge.i2 == node).count()
        } else {
            self.degree(node)
        }
    }

    /// Edges starting in `node`. Undirected graphs have no direction, so this equals the degree.
    pub fn out_degree(&self, node: NodeIndex) -> usize {
        self.check_index(node);
        if self.directed {
            self.edges().filter(|(_, edge)| edge.i1 == node).count()
        } else {
            self.degree(node)
        }
    }

    pub fn is_leaf(&self, node: NodeIndex) -> bool {
        if self.directed {
            matches!(
                (self.in_degree(node), self.out_degree(node)),
                (1, 0) | (0, 1)
            )
        } else {
            self.degree(node) == 1
        }
    }

    /// Live nodes with exactly one touching edge, in index order.
    pub fn leaves(&self) -> Vec<NodeIndex> {
        self.node_indices()
            .filter(|&node| self.is_leaf(node))
            .collect()
    }

    /// Neighbours over any touching edge, regardless of its direction.
    pub fn linked_nodes(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.check_index(node);
        self.edges()
            .filter(|(_, edge)| edge.touches(node))
            .map(|(_, edge)| edge.other(node))
            .unique()
            .collect()
    }

    /// Whether every live node can be reached from every other one, ignoring edge direction.
    pub fn is_connected(&self) -> bool {
        let start = match self.node_indices().next() {
            Some(start) => start,
            None => return true,
        };
        let mut found = vec![false; self.nodes.len()];
        found[start] = true;
        let mut queue = VecDeque::from(vec![start]);
        while let Some(node) = queue.pop_front() {
            for neighbor in self.linked_nodes(node) {
                if !found[neighbor] {
                    found[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
        self.node_indices().all(|node| found[node])
    }

    /// Connect every pair of distinct live nodes (ordered pairs for directed graphs).
    /// `weight` is only asked for pairs that are not yet connected.
    pub fn make_complete<F>(&mut self, mut weight: F)
    where
        F: FnMut(NodeIndex, NodeIndex) -> Weight,
    {
        let live = self.node_indices().collect::<Vec<_>>();
        for &i1 in &live {
            for &i2 in &live {
                let wanted = if self.directed { i1 != i2 } else { i1 < i2 };
                if wanted && self.find_edge(i1, i2).is_none() {
                    self.add_edge(i1, i2, weight(i1, i2));
                }
            }
        }
    }

    /// Soft delete: tombstone the node and every edge touching it. No index changes, so
    /// indices held elsewhere stay valid.
    ///
    /// # Panics
    /// If `node` is out of range.
    pub fn set_node_to_null(&mut self, node: NodeIndex) {
        self.nodes[node] = None;
        for slot in &mut self.edges {
            if matches!(slot, Some(edge) if edge.touches(node)) {
                *slot = None;
            }
        }
    }

    /// Hard delete: drop every edge touching `node`, then compact the node vector.
    ///
    /// Every node index greater than `node` moves down by one and edge endpoints are rewritten
    /// accordingly. Edge indices shift as well. Callers holding indices into this graph have to
    /// adjust them in lockstep.
    ///
    /// # Panics
    /// If `node` is out of range.
    pub fn remove_node(&mut self, node: NodeIndex) {
        self.nodes.remove(node);
        self.edges
            .retain(|slot| !matches!(slot, Some(edge) if edge.touches(node)));
        for edge in self.edges.iter_mut().flatten() {
            if edge.i1 > node {
                edge.i1 -= 1;
            }
            if edge.i2 > node {
                edge.i2 -= 1;
            }
        }
    }

    /// Hard delete live nodes without edges until none are left.
    pub fn remove_unused_nodes(&mut self) {
        loop {
            let unused = self.node_indices().find(|&node| self.degree(node) == 0);
            match unused {
                Some(node) => self.remove_node(node),
                None => return,
            }
        }
    }
}

impl<N: PartialEq> WeightedGraph<N> {
    /// First live node with an equal payload.
    pub fn find_node(&self, node: &N) -> Option<NodeIndex> {
        self.nodes()
            .find(|(_, candidate)| *candidate == node)
            .map(|(index, _)| index)
    }

    pub fn find_or_add_node(&mut self, node: N) -> NodeIndex {
        match self.find_node(&node) {
            Some(index) => index,
            None => self.add_node(node),
        }
    }

    /// Connect two payloads, adding whichever of them is not in the graph yet.
    /// Returns both node indices and the edge index. Same first-weight-wins rule as
    /// [WeightedGraph::add_edge].
    pub fn add_edge_between(
        &mut self,
        n1: N,
        n2: N,
        weight: Weight,
    ) -> (NodeIndex, NodeIndex, EdgeIndex) {
        let i1 = self.find_or_add_node(n1);
        let i2 = self.find_or_add_node(n2);
        let edge = self.add_edge(i1, i2, weight);
        (i1, i2, edge)
    }
}

impl<N: Clone> WeightedGraph<N> {
    /// Replace all nodes (and edges) of this graph by copies of `other`'s live nodes, in order.
    ///
    /// Returns the table from `other`'s indices to the copies. It is the identity exactly when
    /// `other` has no tombstones.
    pub fn copy_nodes_from(&mut self, other: &WeightedGraph<N>) -> IndexMap {
        self.nodes.clear();
        self.edges.clear();
        let mut map = IndexMap::with_len(other.node_count());
        for (index, node) in other.nodes() {
            map.insert(index, self.add_node(node.clone()));
        }
        map
    }
}
