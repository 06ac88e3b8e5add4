//! Benchmark the Steiner tree approximation on a PACE instance.
//! Results go to stdout, log messages to stderr.

use clap::{Parser, Subcommand};
use itertools::{Itertools, MinMaxResult};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use steiner_graph::{GenericResult, Instance, SteinerApproximation, Weight};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "steiner-graph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print size, degree and weight statistics as a CSV row
    Stats {
        /// Instance in PACE 2018 format
        file: PathBuf,
    },

    /// Run the approximation and print tree weight and running time as a CSV row
    Approx {
        /// Instance in PACE 2018 format
        file: PathBuf,

        /// Also print the tree edges (1-based, as in the input)
        #[arg(long)]
        edges: bool,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> GenericResult<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Stats { file } => {
            let instance = read_instance(&file)?;
            let stats = GraphStatistics::new(&instance);
            println!(
                "{fp}, {ne}, {nn}, {nt}, {ad}, {mind}, {maxd}, {aw}, {minw}, {maxw}",
                fp = file.display(),
                ne = stats.num_edges,
                nn = stats.num_nodes,
                nt = stats.num_terminals,
                ad = stats.average_degree,
                mind = stats.min_degree,
                maxd = stats.max_degree,
                aw = stats.average_weight,
                minw = stats.min_weight,
                maxw = stats.max_weight,
            );
        }
        Commands::Approx { file, edges } => {
            let instance = read_instance(&file)?;
            info!("running Kou-Markowitz-Berman approximation...");
            let (tree, time) = measure_time(|| {
                SteinerApproximation::build_tree(&instance.graph, &instance.terminals)
            });
            let tree = tree?;
            info!(
                nodes = tree.graph().live_node_count(),
                edges = tree.graph().live_edge_count(),
                "tree found"
            );
            println!("{}, {}, {}", file.display(), tree.weight(), time.as_nanos());
            if edges {
                let graph = tree.graph();
                for (_, edge) in graph.edges() {
                    if let (Some(from), Some(to)) = (graph.node(edge.i1), graph.node(edge.i2)) {
                        println!("{} {}", from, to);
                    }
                }
            }
        }
    }
    Ok(())
}

fn read_instance(path: &Path) -> GenericResult<Instance> {
    info!("reading graph from {}...", path.display());
    let content = fs::read_to_string(path)?;
    let instance: Instance = content.parse()?;
    debug!(
        nodes = instance.graph.live_node_count(),
        edges = instance.graph.live_edge_count(),
        terminals = instance.terminals.len(),
        "parsed instance"
    );
    Ok(instance)
}

struct GraphStatistics {
    num_edges: usize,
    num_nodes: usize,
    num_terminals: usize,
    average_degree: f64,
    min_degree: usize,
    max_degree: usize,
    average_weight: f64,
    min_weight: Weight,
    max_weight: Weight,
}

impl GraphStatistics {
    fn new(instance: &Instance) -> Self {
        let graph = &instance.graph;
        let degrees = graph
            .node_indices()
            .map(|node| graph.degree(node))
            .collect::<Vec<_>>();
        let weights = graph
            .edges()
            .map(|(_, edge)| edge.weight)
            .collect::<Vec<_>>();
        let (min_degree, max_degree) = bounds(degrees.iter().copied().minmax(), 0);
        let (min_weight, max_weight) = bounds(
            weights.iter().copied().map(ordered_float::OrderedFloat).minmax(),
            ordered_float::OrderedFloat(0.0),
        );
        Self {
            num_edges: weights.len(),
            num_nodes: degrees.len(),
            num_terminals: instance.terminals.len(),
            average_degree: average(degrees.iter().map(|&degree| degree as f64)),
            min_degree,
            max_degree,
            average_weight: average(weights.iter().map(|&weight| f64::from(weight))),
            min_weight: min_weight.0,
            max_weight: max_weight.0,
        }
    }
}

fn bounds<T: Copy>(minmax: MinMaxResult<T>, empty: T) -> (T, T) {
    minmax.into_option().unwrap_or((empty, empty))
}

fn average<I: ExactSizeIterator<Item = f64>>(values: I) -> f64 {
    let len = values.len();
    if len == 0 {
        0.0
    } else {
        values.sum::<f64>() / len as f64
    }
}

// measure running time of a closure
fn measure_time<F: FnOnce() -> R, R>(closure: F) -> (R, Duration) {
    let before = Instant::now();
    let result = closure();
    (result, before.elapsed())
}
