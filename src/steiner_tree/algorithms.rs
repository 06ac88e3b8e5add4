use crate::error::{GraphError, Result};
use crate::graph::{IndexMap, NodeIndex, Weight, WeightedGraph, UNREACHABLE};
use crate::steiner_tree::tree::SteinerTree;
use itertools::Itertools;
use tracing::{debug, trace};

/// Steiner tree approximation by Kou, Markowitz and Berman.
///
/// 1. complete graph over the terminals, weighted by shortest distances in the host
/// 2. minimum spanning tree of that graph
/// 3. replace every tree edge by the shortest path it stands for
/// 4. minimum spanning tree of the union of those paths
/// 5. repeatedly delete leaves that are not terminals
///
/// The result weighs at most `2 - 2/l` times the optimum, `l` being the number of leaves in an
/// optimal tree.
pub struct SteinerApproximation;

impl SteinerApproximation {
    /// Approximate a minimum-weight tree in `host` connecting `terminals` (indices into `host`).
    pub fn build<N>(host: &WeightedGraph<N>, terminals: &[NodeIndex]) -> Result<WeightedGraph<N>>
    where
        N: PartialEq + Clone,
    {
        Self::build_tree(host, terminals).map(SteinerTree::into_graph)
    }

    /// Like [SteinerApproximation::build], additionally reporting where the terminals ended up
    /// in the result.
    ///
    /// # Errors
    /// [GraphError::InvalidTerminal] if a terminal is out of range or a tombstone,
    /// [GraphError::UnreachableTerminals] if the terminals are not all connected in `host`.
    pub fn build_tree<N>(host: &WeightedGraph<N>, terminals: &[NodeIndex]) -> Result<SteinerTree<N>>
    where
        N: PartialEq + Clone,
    {
        let terminals = validate_terminals(host, terminals)?;
        debug!(
            nodes = host.live_node_count(),
            edges = host.live_edge_count(),
            terminals = terminals.len(),
            "building Steiner tree"
        );
        if terminals.is_empty() {
            return Ok(SteinerTree::new(WeightedGraph::new(false), vec![]));
        }

        let (complete, local_to_host) = terminal_distance_graph(host, &terminals);
        let terminal_mst = complete.find_minimum_spanning_tree_kruskal();
        debug!(
            weight = terminal_mst.total_weight(),
            "spanning tree over terminal distances"
        );

        let (expanded, host_to_expanded) = expand_paths(host, &terminal_mst, &local_to_host)?;
        let mut tree = expanded.find_minimum_spanning_tree_kruskal();
        debug!(
            edges = tree.live_edge_count(),
            weight = tree.total_weight(),
            "spanning tree over expanded paths"
        );

        // `expanded` has no tombstones, so its Kruskal tree shares its index space.
        let mut tracked = terminals
            .iter()
            .map(|&terminal| {
                host_to_expanded
                    .get(terminal)
                    .ok_or(GraphError::InvalidTerminal(terminal))
            })
            .collect::<Result<Vec<_>>>()?;
        let pruned = prune_non_terminal_leaves(&mut tree, &mut tracked);
        let unused = remove_unused_non_terminals(&mut tree, &mut tracked);
        debug!(
            pruned,
            unused,
            nodes = tree.live_node_count(),
            weight = tree.total_weight(),
            "Steiner tree done"
        );
        Ok(SteinerTree::new(tree, tracked))
    }
}

/// Reject out-of-range and tombstoned terminals, drop duplicates keeping the first occurrence.
fn validate_terminals<N>(
    host: &WeightedGraph<N>,
    terminals: &[NodeIndex],
) -> Result<Vec<NodeIndex>> {
    if let Some(&invalid) = terminals
        .iter()
        .find(|&&terminal| terminal >= host.node_count() || host.node(terminal).is_none())
    {
        return Err(GraphError::InvalidTerminal(invalid));
    }
    Ok(terminals.iter().copied().unique().collect())
}

/// Complete graph over the terminals. Node `i` of the result is `terminals[i]`, edges are
/// weighted with the shortest distance in `host`, [UNREACHABLE] for disconnected terminals.
fn terminal_distance_graph<N>(
    host: &WeightedGraph<N>,
    terminals: &[NodeIndex],
) -> (WeightedGraph<N>, IndexMap)
where
    N: Clone,
{
    let local_to_host = IndexMap::from_targets(terminals.iter().copied());
    let mut complete = WeightedGraph::new(host.is_directed());
    for &terminal in terminals {
        // validated to be live
        if let Some(node) = host.node(terminal) {
            complete.add_node(node.clone());
        }
    }
    // one single-source run per terminal instead of one query per pair
    let distances = terminals
        .iter()
        .map(|&terminal| host.dijkstra_distances(terminal))
        .collect::<Vec<_>>();
    complete.make_complete(|i1, i2| match local_to_host.get(i2) {
        Some(target) => distances[i1][target],
        None => UNREACHABLE,
    });
    (complete, local_to_host)
}

/// Union of the shortest paths in `host` standing for the edges of `terminal_mst`.
///
/// The result holds a copy of every live host node, the returned table maps host indices to
/// it. Edges keep their host weights.
fn expand_paths<N>(
    host: &WeightedGraph<N>,
    terminal_mst: &WeightedGraph<N>,
    local_to_host: &IndexMap,
) -> Result<(WeightedGraph<N>, IndexMap)>
where
    N: Clone,
{
    let mut expanded = WeightedGraph::new(false);
    let host_to_expanded = expanded.copy_nodes_from(host);
    for (_, edge) in terminal_mst.edges() {
        let (Some(from), Some(to)) = (local_to_host.get(edge.i1), local_to_host.get(edge.i2))
        else {
            continue;
        };
        let path = host
            .dijkstra_shortest_path(from, to)
            .ok_or(GraphError::UnreachableTerminals { from, to })?;
        trace!(from, to, hops = path.edges().len(), "expanding terminal pair");
        for &index in path.edges() {
            let Some(hop) = host.edge(index) else {
                continue;
            };
            if let (Some(i1), Some(i2)) =
                (host_to_expanded.get(hop.i1), host_to_expanded.get(hop.i2))
            {
                expanded.add_edge(i1, i2, hop.weight);
            }
        }
    }
    Ok((expanded, host_to_expanded))
}

/// Hard delete `node` and shift the tracked indices along with the graph.
fn remove_tracked<N>(graph: &mut WeightedGraph<N>, node: NodeIndex, tracked: &mut [NodeIndex]) {
    graph.remove_node(node);
    for index in tracked.iter_mut() {
        if *index > node {
            *index -= 1;
        }
    }
}

/// Delete leaves that are not in `terminals` until there are none. The leaf scan restarts after
/// every deletion since each one shifts indices and may turn the neighbour into a leaf.
/// Returns the number of deleted leaves.
fn prune_non_terminal_leaves<N>(tree: &mut WeightedGraph<N>, terminals: &mut [NodeIndex]) -> usize {
    let mut pruned = 0;
    loop {
        let leaf = tree
            .leaves()
            .into_iter()
            .find(|leaf| !terminals.contains(leaf));
        match leaf {
            Some(leaf) => {
                trace!(leaf, "pruning non-terminal leaf");
                remove_tracked(tree, leaf, terminals);
                pruned += 1;
            }
            None => return pruned,
        }
    }
}

/// Delete nodes without edges, except terminals. A lone terminal is the whole tree when only
/// one terminal was asked for.
fn remove_unused_non_terminals<N>(
    tree: &mut WeightedGraph<N>,
    terminals: &mut [NodeIndex],
) -> usize {
    let mut removed = 0;
    loop {
        let unused = tree
            .node_indices()
            .find(|&node| tree.degree(node) == 0 && !terminals.contains(&node));
        match unused {
            Some(node) => {
                remove_tracked(tree, node, terminals);
                removed += 1;
            }
            None => return removed,
        }
    }
}

/// Sum of the host distances along the edges of a terminal spanning tree, an upper bound on
/// the weight of the final tree.
pub fn terminal_spanning_weight<N>(
    host: &WeightedGraph<N>,
    terminals: &[NodeIndex],
) -> Result<Weight>
where
    N: PartialEq + Clone,
{
    let terminals = validate_terminals(host, terminals)?;
    let (complete, _) = terminal_distance_graph(host, &terminals);
    Ok(complete.find_minimum_spanning_tree_kruskal().total_weight())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{connected_graph, grid};
    use crate::pace::tests::steiner_example_wiki;
    use crate::util::TestResult;
    use proptest::prelude::*;

    #[test]
    fn test_grid_corners() -> TestResult {
        let host = grid(3);
        let corners = [0, 2, 6];
        let tree = SteinerApproximation::build_tree(&host, &corners)?;
        assert_eq!(tree.weight(), 4.0);
        assert!(tree.is_tree());
        assert!(tree.non_terminal_leaves().is_empty());
        assert_eq!(tree.graph().live_node_count(), 5);
        assert_eq!(tree.terminals(), &[0, 2, 4]);
        let payloads = tree
            .terminals()
            .iter()
            .filter_map(|&terminal| tree.graph().node(terminal).copied())
            .collect::<Vec<_>>();
        assert_eq!(payloads, vec![(0, 0), (2, 0), (0, 2)]);
        assert_eq!(tree.weight_in(&host), Some(4.0));

        let graph = SteinerApproximation::build(&host, &corners)?;
        assert_eq!(graph.total_weight(), 4.0);
        for terminal in [(0, 0), (2, 0), (0, 2)] {
            let index = graph.find_node(&terminal).ok_or("terminal missing")?;
            assert!(graph.degree(index) >= 1);
        }
        Ok(())
    }

    #[test]
    fn test_single_terminal() -> TestResult {
        let tree = SteinerApproximation::build_tree(&grid(3), &[4])?;
        assert_eq!(tree.graph().node_count(), 1);
        assert_eq!(tree.graph().edge_count(), 0);
        assert_eq!(tree.graph().node(0), Some(&(1, 1)));
        assert_eq!(tree.terminals(), &[0]);
        Ok(())
    }

    #[test]
    fn test_no_terminals() -> TestResult {
        let tree = SteinerApproximation::build_tree(&grid(3), &[])?;
        assert!(tree.is_empty());
        assert!(tree.terminals().is_empty());
        Ok(())
    }

    #[test]
    fn test_duplicate_terminals() -> TestResult {
        let tree = SteinerApproximation::build_tree(&grid(3), &[8, 0, 8])?;
        assert_eq!(tree.weight(), 4.0);
        assert_eq!(tree.terminals().len(), 2);
        assert_eq!(tree.graph().live_node_count(), 5);
        Ok(())
    }

    #[test]
    fn test_invalid_terminals() {
        let mut host = grid(3);
        assert_eq!(
            SteinerApproximation::build(&host, &[0, 9]).err(),
            Some(GraphError::InvalidTerminal(9))
        );
        host.set_node_to_null(4);
        assert_eq!(
            SteinerApproximation::build(&host, &[4, 0]).err(),
            Some(GraphError::InvalidTerminal(4))
        );
    }

    #[test]
    fn test_unreachable_terminals() {
        let mut host = grid(3);
        let island = host.add_node((9, 9));
        assert_eq!(
            SteinerApproximation::build(&host, &[0, island]).err(),
            Some(GraphError::UnreachableTerminals { from: 0, to: island })
        );
    }

    #[test]
    fn test_host_with_tombstones() -> TestResult {
        let mut host = grid(3);
        // knock out the centre, the corners stay connected around the border
        host.set_node_to_null(4);
        let tree = SteinerApproximation::build_tree(&host, &[0, 8])?;
        assert_eq!(tree.weight(), 4.0);
        assert!(tree.is_tree());
        assert!(tree.non_terminal_leaves().is_empty());
        assert_eq!(tree.weight_in(&host), Some(4.0));
        let payloads = tree
            .terminals()
            .iter()
            .filter_map(|&terminal| tree.graph().node(terminal).copied())
            .collect::<Vec<_>>();
        assert_eq!(payloads, vec![(0, 0), (2, 2)]);
        Ok(())
    }

    #[test]
    fn test_steiner_example_wiki() -> TestResult {
        let instance = steiner_example_wiki()?;
        let tree = SteinerApproximation::build_tree(&instance.graph, &instance.terminals)?;
        // the approximation finds the optimum on this instance
        assert_eq!(tree.weight(), (25 + 30 + 15 + 10 + 40 + 50 + 20) as Weight);
        assert!(tree.is_tree());
        assert!(tree.non_terminal_leaves().is_empty());
        assert_eq!(tree.graph().live_node_count(), 8);
        assert_eq!(
            terminal_spanning_weight(&instance.graph, &instance.terminals)?,
            (20 + 25 + 55 + 100) as Weight
        );
        Ok(())
    }

    /// ```text
    /// 0 --> 1 --> 2 --7--> 4
    ///       ^
    ///       |
    ///       3
    /// ```
    /// Unit weights unless noted. Node 2 is reachable from 0 and 3, nothing reaches 0 or 3.
    fn one_way_host() -> WeightedGraph<char> {
        let mut host = WeightedGraph::new(true);
        for node in "abcde".chars() {
            host.add_node(node);
        }
        host.add_edge(0, 1, 1.0);
        host.add_edge(1, 2, 1.0);
        host.add_edge(3, 1, 1.0);
        host.add_edge(2, 4, 7.0);
        host
    }

    #[test]
    fn test_directed_host() -> TestResult {
        let host = one_way_host();
        // either terminal order ends up using the directions that have a path
        for terminals in [[0, 2, 3], [2, 0, 3]] {
            let tree = SteinerApproximation::build_tree(&host, &terminals)?;
            assert!(!tree.graph().is_directed());
            assert_eq!(tree.weight(), 3.0);
            assert!(tree.is_tree());
            assert!(tree.non_terminal_leaves().is_empty());
            assert_eq!(tree.graph().live_node_count(), 4);
            assert_eq!(tree.terminals(), &terminals);
            assert_eq!(tree.graph().find_node(&'e'), None);
            assert_eq!(terminal_spanning_weight(&host, &terminals)?, 4.0);
        }
        Ok(())
    }

    #[test]
    fn test_directed_host_unreachable_both_ways() {
        assert_eq!(
            SteinerApproximation::build(&one_way_host(), &[0, 3]).err(),
            Some(GraphError::UnreachableTerminals { from: 0, to: 3 })
        );
    }

    #[test]
    fn test_pruning_shifts_tracked_terminals() {
        // 0 - 1 - 2 - 3 with a dangling 4 on node 1
        let mut tree = WeightedGraph::new(false);
        for node in 0..5 {
            tree.add_node(node);
        }
        tree.add_edge(0, 1, 1.0);
        tree.add_edge(1, 2, 1.0);
        tree.add_edge(2, 3, 1.0);
        tree.add_edge(1, 4, 1.0);
        let mut terminals = vec![4, 2];
        assert_eq!(prune_non_terminal_leaves(&mut tree, &mut terminals), 2);
        assert_eq!(terminals, vec![2, 1]);
        assert_eq!(
            tree.nodes().map(|(_, &node)| node).collect::<Vec<_>>(),
            vec![1, 2, 4]
        );
        assert_eq!(tree.leaves(), vec![1, 2]);
    }

    proptest! {
        #[test]
        fn prop_steiner_tree_spans_terminals(
            host in connected_graph(),
            picks in proptest::collection::vec(any::<prop::sample::Index>(), 1..6),
        ) {
            let terminals = picks
                .iter()
                .map(|pick| pick.index(host.node_count()))
                .collect::<Vec<_>>();
            let tree = SteinerApproximation::build_tree(&host, &terminals);
            prop_assert!(tree.is_ok());
            if let Ok(tree) = tree {
                prop_assert!(tree.is_tree());
                prop_assert!(tree.non_terminal_leaves().is_empty());
                prop_assert_eq!(tree.weight_in(&host), Some(tree.weight()));
                let bound = terminal_spanning_weight(&host, &terminals).unwrap_or(UNREACHABLE);
                prop_assert!(tree.weight() <= bound);
                let distinct = terminals.iter().unique().count();
                prop_assert_eq!(tree.terminals().len(), distinct);
                for (&requested, &found) in terminals.iter().unique().zip(tree.terminals()) {
                    prop_assert_eq!(tree.graph().node(found), host.node(requested));
                    if distinct > 1 {
                        prop_assert!(tree.graph().degree(found) >= 1);
                    }
                }
            }
        }
    }
}
