//! QCUT Max-Cut demo
//!
//! Optimizes a seeded G(n, p) graph with every preset and prints the final
//! parameters, objective and a comparison table.
//!
//! Usage: `cargo run --example maxcut_demo -- [nodes] [layers] [budget]`
//! (defaults 8, 2, 100; the reference runs use 15 nodes and 8 layers).

use anyhow::{bail, Context, Result};
use qcut_bench::prelude::*;
use qcut_core::constants::graph::DEFAULT_EDGE_PROBABILITY;
use qcut_engine::{QaoaConfig, QaoaRunner};

fn arg_or(index: usize, default: usize) -> Result<usize> {
    match std::env::args().nth(index) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("argument {} ('{}') is not a count", index, raw)),
        None => Ok(default),
    }
}

fn main() -> Result<()> {
    let nodes = arg_or(1, 8)?;
    let layers = arg_or(2, 2)?;
    let budget = arg_or(3, 100)?;
    if nodes == 0 {
        bail!("need at least one node");
    }

    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║                    QCUT Max-Cut QAOA Demo                            ║");
    println!("╚══════════════════════════════════════════════════════════════════════╝\n");

    let generator = GraphGenerator::new();
    let graph = generator.erdos_renyi(nodes, DEFAULT_EDGE_PROBABILITY);

    println!("Configuration:");
    println!("  • Graph: {}", graph);
    println!("  • Layers: {}", layers);
    println!("  • Evaluation budget: {}", budget);
    println!("  • Seed: {:?}", generator.seed());
    println!();

    // =========================================================================
    // Single baseline run
    // =========================================================================
    let config = QaoaConfig::baseline()
        .with_layers(layers)
        .with_max_evaluations(budget);
    let result = QaoaRunner::new(graph.clone(), config)
        .run()
        .context("baseline optimization failed")?;

    println!("{}\n", result);

    // =========================================================================
    // Preset comparison
    // =========================================================================
    let mut suite = BenchSuite::new()
        .with_layers(layers)
        .with_max_evaluations(budget);
    let results = suite.run_presets(&graph).context("preset comparison failed")?;

    println!("{}", Reporter::preset_report(&results));
    println!("{}", Reporter::to_text(suite.results()));

    Ok(())
}
