use crate::graph::{NodeIndex, Weight, WeightedGraph};

/// Result of a Steiner tree construction.
///
/// `terminals` are indices into `graph`, in the order the terminals were requested (duplicates
/// removed). They generally differ from the host graph's indices since unused nodes have been
/// compacted away.
#[derive(Clone, Debug)]
pub struct SteinerTree<N> {
    graph: WeightedGraph<N>,
    terminals: Vec<NodeIndex>,
}

impl<N> SteinerTree<N> {
    pub(crate) fn new(graph: WeightedGraph<N>, terminals: Vec<NodeIndex>) -> Self {
        Self { graph, terminals }
    }

    pub fn graph(&self) -> &WeightedGraph<N> {
        &self.graph
    }

    pub fn into_graph(self) -> WeightedGraph<N> {
        self.graph
    }

    pub fn terminals(&self) -> &[NodeIndex] {
        &self.terminals
    }

    pub fn weight(&self) -> Weight {
        self.graph.total_weight()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.live_node_count() == 0
    }

    /// Leaves that are not terminals. Empty for every tree the approximation returns.
    pub fn non_terminal_leaves(&self) -> Vec<NodeIndex> {
        self.graph
            .leaves()
            .into_iter()
            .filter(|leaf| !self.terminals.contains(leaf))
            .collect()
    }

    /// Connected and without cycles.
    pub fn is_tree(&self) -> bool {
        let nodes = self.graph.live_node_count();
        nodes == 0 || (self.graph.live_edge_count() == nodes - 1 && self.graph.is_connected())
    }
}

impl<N: PartialEq> SteinerTree<N> {
    /// Weight of the tree's edges measured in `host`, matching nodes by payload.
    /// `None` if some edge has no counterpart there.
    ///
    /// Payloads have to be unique among the live nodes of `host`: a repeated payload always
    /// resolves to its first occurrence (see [WeightedGraph::find_node]), which may not be the
    /// node the tree was built from.
    pub fn weight_in(&self, host: &WeightedGraph<N>) -> Option<Weight> {
        let mut weight = 0.0;
        for (_, edge) in self.graph.edges() {
            let i1 = host.find_node(self.graph.node(edge.i1)?)?;
            let i2 = host.find_node(self.graph.node(edge.i2)?)?;
            weight += host.weight(i1, i2)?;
        }
        Some(weight)
    }
}
