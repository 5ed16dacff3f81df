//! End-to-end QAOA run for QCUT
//!
//! Gantree: L7_Integration → QaoaRunner
//!
//! Wires resources, evaluator and Nelder-Mead into one call and reports the
//! final parameters together with the cut they produce.

use crate::config::QaoaConfig;
use crate::objective::ObjectiveEvaluator;
use crate::optimizer::{minimize, EvaluationRecord, MinimizeOptions, NelderMead, OptimizationState};
use crate::resources::ResourceManager;
use log::info;
use qcut_backend::{profile, InvocationTiming, TimingSummary};
use qcut_core::{types::assignment_bitstring, Graph, ParamVec, QcutError, QcutResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Result of one optimization run
/// Gantree: OptimizationResult // 실행 결과
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Graph label
    pub graph_name: Option<String>,

    /// Node count (= qubits)
    pub num_nodes: usize,

    /// Edge count
    pub num_edges: usize,

    /// Configuration used
    pub config: QaoaConfig,

    // ========================================================================
    // Optimizer Output
    // ========================================================================
    /// Best parameter vector
    pub optimal_params: ParamVec,

    /// Objective at `optimal_params` (negated expected cut)
    pub optimal_value: f64,

    /// Objective evaluations
    pub evaluations: usize,

    /// Whether Nelder-Mead converged
    pub converged: bool,

    /// Stop reason
    pub state: OptimizationState,

    /// Per-evaluation history
    pub history: Vec<EvaluationRecord>,

    // ========================================================================
    // Solution Quality
    // ========================================================================
    /// Most likely assignment at `optimal_params`
    pub best_assignment: usize,

    /// Its probability
    pub best_assignment_probability: f64,

    /// Its cut value
    pub best_assignment_cut: f64,

    /// Exact maximum cut
    pub max_cut: f64,

    /// Expected cut over exact maximum
    pub approximation_ratio: f64,

    // ========================================================================
    // Execution Metrics
    // ========================================================================
    /// Wall time of the whole run
    pub wall_time_ms: u64,

    /// Peak bytes held by run resources
    pub footprint_bytes: usize,

    /// Per-evaluation timings (profiling only)
    pub timings: Vec<InvocationTiming>,
}

impl OptimizationResult {
    /// Expected cut at the optimum
    pub fn expected_cut(&self) -> f64 {
        -self.optimal_value
    }

    /// Best assignment as a bit string, node 0 first
    pub fn best_bitstring(&self) -> String {
        assignment_bitstring(self.best_assignment, self.num_nodes)
    }

    /// Aggregate timings, if any were recorded
    pub fn timing_summary(&self) -> Option<TimingSummary> {
        (!self.timings.is_empty()).then(|| profile::summarize(&self.timings))
    }

    /// `BeginNs,EndNs,DurationNs` table of the recorded timings
    pub fn timings_csv(&self) -> String {
        profile::timings_to_csv(&self.timings)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> QcutResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.optimal_params.iter().map(|p| format!("{:.6}", p)).collect();
        writeln!(f, "Optimal parameters: [{}]", params.join(", "))?;
        writeln!(f, "Optimal value: {:.10}", self.optimal_value)?;
        writeln!(
            f,
            "Evaluations: {} ({}), wall time {} ms",
            self.evaluations, self.state, self.wall_time_ms
        )?;
        write!(
            f,
            "Best assignment: {} (p={:.4}, cut={}), max cut {}, ratio {:.4}",
            self.best_bitstring(),
            self.best_assignment_probability,
            self.best_assignment_cut,
            self.max_cut,
            self.approximation_ratio
        )
    }
}

/// One-call QAOA optimization
/// Gantree: QaoaRunner // 통합 실행
#[derive(Debug, Clone)]
pub struct QaoaRunner {
    graph: Arc<Graph>,
    config: QaoaConfig,
}

impl QaoaRunner {
    /// Runner for `graph` under `config`
    pub fn new(graph: impl Into<Arc<Graph>>, config: QaoaConfig) -> Self {
        Self {
            graph: graph.into(),
            config,
        }
    }

    /// Configuration
    pub fn config(&self) -> &QaoaConfig {
        &self.config
    }

    /// Problem graph
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Optimize from the configured initial point
    /// Gantree: run(&self) -> Result<OptimizationResult> // 실행
    pub fn run(&self) -> QcutResult<OptimizationResult> {
        let initial = self.config.initial_parameters();
        self.run_from(&initial)
    }

    /// Optimize from `initial`
    pub fn run_from(&self, initial: &[f64]) -> QcutResult<OptimizationResult> {
        let start = Instant::now();
        self.config.validate().map_err(QcutError::ConfigError)?;

        info!(
            "Starting QAOA run on {} nodes / {} edges: {}",
            self.graph.num_nodes(),
            self.graph.num_edges(),
            self.config
        );
        if self.config.verbose {
            println!("Starting QCUT optimization: {}", self.config);
        }

        let resources = ResourceManager::new(Arc::clone(&self.graph), &self.config)?;
        let footprint_bytes = resources.footprint_bytes();
        let costs = Arc::clone(resources.costs());

        let mut evaluator = ObjectiveEvaluator::new(resources, self.config.layers)?
            .with_profiling(self.config.profiling);

        let mut strategy = NelderMead::new(initial, self.config.initial_step)
            .with_tolerances(self.config.xatol, self.config.fatol);
        let options = MinimizeOptions {
            verbose: self.config.verbose,
            ..MinimizeOptions::with_budget(self.config.max_evaluations)
        };

        let outcome = minimize(&mut strategy, |params| evaluator.evaluate(params), &options)?;

        let (best_assignment, best_assignment_probability) =
            evaluator.most_likely(&outcome.best_params)?;
        let best_assignment_cut = costs.get(best_assignment).unwrap_or(f64::NAN);
        let (_, max_cut) = costs.max_cut();
        let expected_cut = -outcome.best_value;
        let approximation_ratio = if max_cut > 0.0 {
            expected_cut / max_cut
        } else {
            1.0
        };

        let timings = evaluator.timings().to_vec();
        let footprint_bytes = footprint_bytes.max(evaluator.resources().footprint_bytes());
        let mut resources = evaluator.into_resources();
        resources.teardown();

        let wall_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            "QAOA run finished: value {:.8} after {} evaluations ({}), {} ms",
            outcome.best_value, outcome.evaluations, outcome.state, wall_time_ms
        );
        if self.config.verbose {
            println!(
                "Optimization complete: <C> = {:.6} (ratio {:.4}) in {} ms",
                expected_cut, approximation_ratio, wall_time_ms
            );
        }

        Ok(OptimizationResult {
            graph_name: self.graph.name().map(str::to_string),
            num_nodes: self.graph.num_nodes(),
            num_edges: self.graph.num_edges(),
            config: self.config.clone(),
            optimal_params: outcome.best_params,
            optimal_value: outcome.best_value,
            evaluations: outcome.evaluations,
            converged: outcome.converged,
            state: outcome.state,
            history: outcome.history,
            best_assignment,
            best_assignment_probability,
            best_assignment_cut,
            max_cut,
            approximation_ratio,
            wall_time_ms,
            footprint_bytes,
            timings,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qcut_core::Device;

    #[test]
    fn test_run_single_edge() {
        let graph = Graph::unweighted(2, &[(0, 1)]).unwrap();
        let config = QaoaConfig::baseline()
            .with_layers(1)
            .with_max_evaluations(200);
        let result = QaoaRunner::new(graph, config).run().unwrap();

        assert!(result.optimal_value < -0.99);
        assert_eq!(result.max_cut, 1.0);
        assert!(result.approximation_ratio > 0.99);
        assert_eq!(result.best_assignment_cut, 1.0);
        assert!(result.evaluations <= 200);
        assert_eq!(result.history.len(), result.evaluations);
    }

    #[test]
    fn test_display_contains_parameters_and_value() {
        let config = QaoaConfig::edge_local().with_layers(1).with_max_evaluations(10);
        let result = QaoaRunner::new(Graph::path(3), config).run().unwrap();
        let text = result.to_string();

        assert!(text.contains("Optimal parameters: ["));
        assert!(text.contains("Optimal value: "));
        assert_eq!(result.evaluations, 10);
        assert_eq!(result.state, OptimizationState::BudgetExhausted);
    }

    #[test]
    fn test_profiled_accelerated_run() {
        let config = QaoaConfig::accelerated()
            .with_layers(1)
            .with_max_evaluations(8)
            .with_device(Device::Accelerator);
        let result = QaoaRunner::new(Graph::cycle(4), config).run().unwrap();

        assert_eq!(result.timings.len(), 8);
        assert_eq!(result.timing_summary().unwrap().count, 8);
        assert!(result.timings_csv().starts_with("BeginNs,EndNs,DurationNs\n"));

        let json = result.to_json().unwrap();
        assert!(json.contains("\"optimal_params\""));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = QaoaConfig::baseline().with_max_evaluations(0);
        let err = QaoaRunner::new(Graph::cycle(3), config).run().unwrap_err();
        assert!(matches!(err, QcutError::ConfigError(_)));
        assert!(err.is_validation_error());
    }

    #[test]
    fn test_capacity_error_surfaces() {
        let config = QaoaConfig::baseline().with_layers(1).with_memory_limit(64);
        let err = QaoaRunner::new(Graph::cycle(5), config).run().unwrap_err();
        assert!(err.is_capacity_error());
    }
}
