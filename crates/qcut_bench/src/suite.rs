//! Benchmark suite for QCUT
//!
//! Gantree: L8_Benchmark → BenchSuite
//!
//! Runs the QAOA optimizer over generated graphs and collects comparable
//! per-run records.

use crate::generators::GraphGenerator;
use log::info;
use qcut_core::{Graph, QcutError, QcutResult};
use qcut_engine::{OptimizationResult, QaoaConfig, QaoaRunner};
use serde::{Deserialize, Serialize};

/// Preset names in run order
pub const PRESET_NAMES: [&str; 4] = ["baseline", "edge_local", "accelerated", "memory_optimised"];

/// Single benchmark result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Benchmark name
    pub name: String,

    /// Graph label
    pub graph: String,

    /// Node count
    pub nodes: usize,

    /// Edge count
    pub edges: usize,

    /// Configuration preset label
    pub preset: String,

    /// Ansatz layers
    pub layers: usize,

    /// Best objective value
    pub optimal_value: f64,

    /// Expected cut at the optimum
    pub expected_cut: f64,

    /// Exact maximum cut
    pub max_cut: f64,

    /// expected / max
    pub approximation_ratio: f64,

    /// Objective evaluations
    pub evaluations: usize,

    /// Converged before the budget ran out
    pub converged: bool,

    /// Wall time (milliseconds)
    pub time_ms: u64,

    /// Peak resource bytes
    pub footprint_bytes: usize,
}

impl BenchmarkResult {
    /// Create from an optimization result
    pub fn from_optimization(name: &str, preset: &str, result: &OptimizationResult) -> Self {
        Self {
            name: name.to_string(),
            graph: result.graph_name.clone().unwrap_or_else(|| "unnamed".to_string()),
            nodes: result.num_nodes,
            edges: result.num_edges,
            preset: preset.to_string(),
            layers: result.config.layers,
            optimal_value: result.optimal_value,
            expected_cut: result.expected_cut(),
            max_cut: result.max_cut,
            approximation_ratio: result.approximation_ratio,
            evaluations: result.evaluations,
            converged: result.converged,
            time_ms: result.wall_time_ms,
            footprint_bytes: result.footprint_bytes,
        }
    }
}

/// Benchmark suite
/// Gantree: BenchSuite // 벤치마크 스위트
pub struct BenchSuite {
    /// Base seed for generated graphs
    seed: u64,

    /// Results
    results: Vec<BenchmarkResult>,

    /// Layers applied on top of every preset
    layers: usize,

    /// Evaluation budget applied on top of every preset
    max_evaluations: usize,

    /// Verbose output
    verbose: bool,
}

impl BenchSuite {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create new benchmark suite
    pub fn new() -> Self {
        Self::with_seed(qcut_core::constants::graph::DEFAULT_SEED)
    }

    /// Create with seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            results: Vec::new(),
            layers: 1,
            max_evaluations: qcut_core::qaoa::DEFAULT_MAX_EVALUATIONS,
            verbose: false,
        }
    }

    /// Ansatz depth used by every run
    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = layers;
        self
    }

    /// Evaluation budget used by every run
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Graph generator seeded like this suite
    pub fn generator(&self) -> GraphGenerator {
        GraphGenerator::with_seed(self.seed)
    }

    // ========================================================================
    // Individual Benchmarks
    // ========================================================================

    /// Optimize `graph` under `config`
    /// Gantree: bench_graph(name, graph, preset, config) -> Result // 단일 실행
    pub fn bench_graph(
        &mut self,
        name: &str,
        graph: Graph,
        preset: &str,
        config: QaoaConfig,
    ) -> QcutResult<BenchmarkResult> {
        if self.verbose {
            println!(
                "Running benchmark: {} ({} nodes, {} edges, {})",
                name,
                graph.num_nodes(),
                graph.num_edges(),
                preset
            );
        }

        let result = QaoaRunner::new(graph, config).run()?;
        let bench_result = BenchmarkResult::from_optimization(name, preset, &result);
        info!(
            "Benchmark {}: <C> = {:.4} of {} after {} evaluations ({} ms)",
            name, bench_result.expected_cut, bench_result.max_cut, bench_result.evaluations, bench_result.time_ms
        );
        self.results.push(bench_result.clone());

        Ok(bench_result)
    }

    /// Optimize `graph` under the named preset and this suite's depth/budget
    pub fn bench_preset(&mut self, name: &str, graph: Graph, preset: &str) -> QcutResult<BenchmarkResult> {
        let config = self.preset_config(preset)?;
        self.bench_graph(name, graph, preset, config)
    }

    fn preset_config(&self, preset: &str) -> QcutResult<QaoaConfig> {
        QaoaConfig::preset(preset)
            .map(|c| {
                c.with_layers(self.layers)
                    .with_max_evaluations(self.max_evaluations)
            })
            .ok_or_else(|| QcutError::ConfigError(format!("unknown preset '{}'", preset)))
    }

    // ========================================================================
    // Benchmark Suites
    // ========================================================================

    /// Every preset on the same graph
    pub fn run_presets(&mut self, graph: &Graph) -> QcutResult<Vec<BenchmarkResult>> {
        if self.verbose {
            println!("=== Preset Comparison ===");
        }

        let label = graph.name().unwrap_or("graph").to_string();
        PRESET_NAMES
            .iter()
            .map(|preset| {
                let name = format!("{}_{}", label, preset);
                self.bench_preset(&name, graph.clone(), preset)
            })
            .collect()
    }

    /// Seeded `G(n, p)` over `sizes` under one preset
    pub fn run_node_scaling(
        &mut self,
        sizes: &[usize],
        p: f64,
        preset: &str,
    ) -> QcutResult<Vec<BenchmarkResult>> {
        if self.verbose {
            println!("=== Node Scaling Benchmark ===");
        }

        self.generator()
            .node_scaling(sizes, p)
            .into_iter()
            .map(|graph| {
                let name = format!("node_scaling_{}n", graph.num_nodes());
                self.bench_preset(&name, graph, preset)
            })
            .collect()
    }

    /// Standard small graphs under one preset
    pub fn run_standard_graphs(&mut self, n: usize, preset: &str) -> QcutResult<Vec<BenchmarkResult>> {
        if self.verbose {
            println!("=== Standard Graphs ===");
        }

        let gen = self.generator();
        let graphs = vec![gen.cycle(n), gen.path(n), gen.star(n), gen.complete(n)];
        graphs
            .into_iter()
            .map(|graph| {
                let name = graph.name().unwrap_or("graph").to_string();
                self.bench_preset(&name, graph, preset)
            })
            .collect()
    }

    /// Run quick benchmark (for testing)
    pub fn run_quick(&mut self) -> QcutResult<Vec<BenchmarkResult>> {
        if self.verbose {
            println!("=== Running Quick Benchmark ===");
        }

        let gen = self.generator();
        Ok(vec![
            self.bench_preset("quick_edge", gen.single_edge(), "baseline")?,
            self.bench_preset("quick_cycle4", gen.cycle(4), "edge_local")?,
        ])
    }

    // ========================================================================
    // Results
    // ========================================================================

    /// Get all results
    pub fn results(&self) -> &[BenchmarkResult] {
        &self.results
    }

    /// Clear results
    pub fn clear(&mut self) {
        self.results.clear();
    }

    /// Get statistics
    pub fn statistics(&self) -> BenchmarkStatistics {
        BenchmarkStatistics::from_results(&self.results)
    }
}

impl Default for BenchSuite {
    fn default() -> Self {
        Self::new()
    }
}

/// Benchmark statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkStatistics {
    /// Number of benchmarks
    pub count: usize,

    /// Average approximation ratio
    pub avg_ratio: f64,

    /// Best approximation ratio
    pub max_ratio: f64,

    /// Worst approximation ratio
    pub min_ratio: f64,

    /// Average evaluations per run
    pub avg_evaluations: f64,

    /// Average execution time (ms)
    pub avg_time_ms: f64,

    /// Total execution time (ms)
    pub total_time_ms: u64,

    /// Fraction of runs that converged
    pub convergence_rate: f64,
}

impl BenchmarkStatistics {
    /// Compute statistics from results
    pub fn from_results(results: &[BenchmarkResult]) -> Self {
        if results.is_empty() {
            return Self::default();
        }

        let count = results.len();
        let ratios: Vec<f64> = results.iter().map(|r| r.approximation_ratio).collect();
        let total_time_ms: u64 = results.iter().map(|r| r.time_ms).sum();
        let evaluations: usize = results.iter().map(|r| r.evaluations).sum();
        let converged = results.iter().filter(|r| r.converged).count();

        Self {
            count,
            avg_ratio: ratios.iter().sum::<f64>() / count as f64,
            max_ratio: ratios.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            min_ratio: ratios.iter().cloned().fold(f64::INFINITY, f64::min),
            avg_evaluations: evaluations as f64 / count as f64,
            avg_time_ms: total_time_ms as f64 / count as f64,
            total_time_ms,
            convergence_rate: converged as f64 / count as f64,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
