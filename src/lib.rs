//! A generic weighted graph with shortest paths, minimum spanning trees and an approximate
//! Steiner tree construction.
//!
//! ```
//! use steiner_graph::{SteinerApproximation, WeightedGraph};
//!
//! // a - b - c, plus an expensive shortcut a - c
//! let mut graph = WeightedGraph::new(false);
//! let (a, _, _) = graph.add_edge_between("a", "b", 1.0);
//! let (_, c, _) = graph.add_edge_between("b", "c", 1.0);
//! graph.add_edge(a, c, 5.0);
//!
//! assert_eq!(graph.dijkstra_distance(a, c), 2.0);
//! assert_eq!(graph.find_minimum_spanning_tree_kruskal().total_weight(), 2.0);
//!
//! let tree = SteinerApproximation::build(&graph, &[a, c]).unwrap();
//! assert_eq!(tree.total_weight(), 2.0);
//! assert!(tree.find_node(&"b").is_some());
//! ```

pub mod error;
pub mod graph;
pub mod mst;
pub mod pace;
pub mod shortest_paths;
pub mod steiner_tree;
pub mod util;

pub use error::{GraphError, Result};
pub use graph::{
    Edge, EdgeIndex, IndexMap, NodeIndex, Weight, WeightedGraph, DEFAULT_WEIGHT, UNREACHABLE,
};
pub use mst::UnionFind;
pub use pace::{Instance, ParseError};
pub use shortest_paths::ShortestPath;
pub use steiner_tree::algorithms::{terminal_spanning_weight, SteinerApproximation};
pub use steiner_tree::tree::SteinerTree;
pub use util::GenericResult;
