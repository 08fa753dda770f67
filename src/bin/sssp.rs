use std::time::Instant;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use fib_sssp::graph::{DenseGraph, Weight, INF};
use fib_sssp::pathfinding::{ShortestPathSolver, ShortestPaths, Strategy};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Flat,
    Forest,
    Both,
}

/// Shortest paths on a random dense graph
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Number of vertices
    #[arg(short = 'n', long, default_value_t = 2000)]
    vertices: usize,

    /// Source vertex
    #[arg(short, long, default_value_t = 0)]
    source: usize,

    /// Seed for the graph generator; random if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Largest edge weight (weights are drawn from 1..=max)
    #[arg(long, value_name = "max", default_value_t = 99)]
    max_weight: Weight,

    /// Which strategy to run
    #[arg(long, value_enum, default_value_t = StrategyArg::Forest)]
    strategy: StrategyArg,

    /// Cross-check the result against the other strategy
    #[arg(long)]
    verify: bool,
}

fn run(graph: &DenseGraph, source: usize, strategy: Strategy) -> Result<ShortestPaths> {
    let solver = ShortestPathSolver::builder(graph)
        .source(source)
        .strategy(strategy)
        .build()?;
    let now = Instant::now();
    let paths = solver.solve()?;
    let stats = paths.stats();
    info!(
        "{strategy:?}: {:?} ({} extractions, {} relaxations, {} improvements)",
        now.elapsed(),
        stats.extractions,
        stats.relaxations,
        stats.improvements
    );
    Ok(paths)
}

/// Strategy a result is cross-checked against: the other one
fn cross_check_strategy(primary: Strategy) -> Strategy {
    match primary {
        Strategy::FlatScan => Strategy::Forest,
        Strategy::Forest => Strategy::FlatScan,
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let seed = cli.seed.unwrap_or_else(rand::random);
    info!("generating {} vertices with seed {seed}", cli.vertices);
    let mut rng = StdRng::seed_from_u64(seed);
    let graph = DenseGraph::random_symmetric(cli.vertices, cli.max_weight, &mut rng);

    let primary = match cli.strategy {
        StrategyArg::Flat => Strategy::FlatScan,
        StrategyArg::Forest | StrategyArg::Both => Strategy::Forest,
    };
    let paths = run(&graph, cli.source, primary)?;

    let verify = cli.verify || cli.strategy == StrategyArg::Both;
    if verify {
        let other = cross_check_strategy(primary);
        let baseline = run(&graph, cli.source, other)?;
        if baseline.distances() != paths.distances() {
            let first = (0..cli.vertices)
                .find(|&v| baseline.distances()[v] != paths.distances()[v])
                .unwrap_or_default();
            warn!(
                "vertex {first}: {other:?} {} vs {primary:?} {}",
                baseline.distances()[first],
                paths.distances()[first]
            );
            bail!("distance vectors differ");
        }
        info!("solution verified against {other:?}");
    }

    let reachable = (0..cli.vertices).filter(|&v| paths.is_reachable(v)).count();
    println!(
        "{reachable}/{} vertices reachable from {}, farthest at {}",
        cli.vertices,
        cli.source,
        paths
            .distances()
            .iter()
            .filter_map(|&d| (d != INF).then_some(d))
            .max()
            .unwrap_or_default()
    );
    Ok(())
}
