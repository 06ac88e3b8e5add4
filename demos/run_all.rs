use std::collections::HashSet;
use std::error::Error;
use std::{env, fs};
use steiner_graph::{terminal_spanning_weight, Instance, SteinerApproximation, SteinerTree};

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.len() != 1 {
        eprintln!("expected a file name");
        std::process::exit(1);
    }
    let filename = &args[0];
    println!("reading graph...");
    let content = fs::read_to_string(filename)?;
    let instance: Instance = content.parse()?;

    println!("Kou et al. approximation...");
    let tree = SteinerApproximation::build_tree(&instance.graph, &instance.terminals)?;
    assert_plausible_steiner_tree(&tree, &instance);
    println!("Kou et al. approx. tree edges = {}", sorted_edges(&tree));
    println!("Kou et al. approx. tree weight = {}", tree.weight());
    println!();

    println!("Checking upper bound...");
    let bound = terminal_spanning_weight(&instance.graph, &instance.terminals)?;
    assert!(tree.weight() <= bound);
    println!("{} <= {}", tree.weight(), bound);
    Ok(())
}

// Edges as sorted pairs of the 1-based node numbers of the input file.
fn sorted_edges(tree: &SteinerTree<usize>) -> String {
    let graph = tree.graph();
    let mut edges = graph
        .edges()
        .filter_map(|(_, edge)| Some((*graph.node(edge.i1)?, *graph.node(edge.i2)?)))
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect::<Vec<_>>();
    edges.sort_unstable();
    format!("{:?}", edges)
}

// Perform some sanity checks on the generated tree.
fn assert_plausible_steiner_tree(tree: &SteinerTree<usize>, instance: &Instance) {
    assert_contains_terminals(tree, instance);
    assert!(
        tree.non_terminal_leaves().is_empty(),
        "tree has leaves that are not terminals"
    );
    assert!(tree.is_tree(), "result is not a tree");
    assert_eq!(tree.weight_in(&instance.graph), Some(tree.weight()));
}

// Check that the tree contains all terminals.
fn assert_contains_terminals(tree: &SteinerTree<usize>, instance: &Instance) {
    let nodes = tree
        .graph()
        .nodes()
        .map(|(_, &node)| node)
        .collect::<HashSet<_>>();
    for &terminal in &instance.terminals {
        let payload = instance.graph.node(terminal);
        assert!(
            payload.map_or(false, |payload| nodes.contains(payload)),
            "tree does not contain terminal {:?}",
            payload
        );
    }
}
