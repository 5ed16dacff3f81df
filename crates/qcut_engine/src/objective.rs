//! Objective evaluation for QCUT
//!
//! Gantree: L7_Integration → ObjectiveEvaluator
//!
//! Maps a parameter vector to the negated expected cut: build the circuit,
//! run it on the run's simulator, fold the readout with the cost table.

use crate::resources::ResourceManager;
use log::{debug, warn};
use qcut_backend::{FinalizeMode, InvocationTiming, Profiler, SimulationOutput};
use qcut_core::{build, QcutError, QcutResult};

/// Negated expected cut of a QAOA circuit
/// Gantree: ObjectiveEvaluator // 목적 함수
#[derive(Debug)]
pub struct ObjectiveEvaluator {
    resources: ResourceManager,
    layers: usize,
    profiler: Option<Profiler>,
    evaluations: usize,
}

impl ObjectiveEvaluator {
    /// Evaluator over `resources` for a `layers`-layer ansatz
    ///
    /// Sampling simulators are refused: the optimizer expects a
    /// deterministic objective.
    pub fn new(resources: ResourceManager, layers: usize) -> QcutResult<Self> {
        let simulator = resources.simulator();
        if !simulator.is_exact() {
            return Err(QcutError::NonExactSimulator(simulator.name().to_string()));
        }

        Ok(Self {
            resources,
            layers,
            profiler: None,
            evaluations: 0,
        })
    }

    /// Record a timing for every evaluation
    pub fn with_profiling(mut self, enabled: bool) -> Self {
        self.profiler = enabled.then(Profiler::new);
        self
    }

    /// Number of ansatz layers
    pub fn layers(&self) -> usize {
        self.layers
    }

    /// Evaluations performed
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Profiler, if profiling is enabled
    pub fn profiler(&self) -> Option<&Profiler> {
        self.profiler.as_ref()
    }

    /// Recorded timings (empty without profiling)
    pub fn timings(&self) -> &[InvocationTiming] {
        self.profiler.as_ref().map(|p| p.records()).unwrap_or(&[])
    }

    /// Run resources
    pub fn resources(&self) -> &ResourceManager {
        &self.resources
    }

    /// Give back the resources
    pub fn into_resources(self) -> ResourceManager {
        self.resources
    }

    /// Objective value `-⟨C⟩` at `params`
    ///
    /// Non-finite values are returned unchanged.
    /// Gantree: evaluate(params) -> Result<f64> // 평가
    pub fn evaluate(&mut self, params: &[f64]) -> QcutResult<f64> {
        let ctx = self.resources.split()?;
        let circuit = build(ctx.graph, self.layers, params, ctx.representation)?;
        self.evaluations += 1;

        let mut simulate = || -> QcutResult<f64> {
            let output = ctx.simulator.run(&circuit, ctx.scratch, ctx.mode)?;
            output.expected_cost(ctx.costs)
        };

        let expected = match self.profiler.as_mut() {
            Some(profiler) => profiler.time(simulate).0,
            None => simulate(),
        }?;
        let value = -expected;

        if value.is_finite() {
            debug!("evaluation {}: {:?} -> {:.10}", self.evaluations, params, value);
        } else {
            warn!(
                "evaluation {} produced non-finite objective {} at {:?}",
                self.evaluations, value, params
            );
        }

        Ok(value)
    }

    /// Most likely assignment at `params` and its probability
    /// Gantree: most_likely(params) -> Result<(usize, f64)> // 최빈 할당
    pub fn most_likely(&mut self, params: &[f64]) -> QcutResult<(usize, f64)> {
        let ctx = self.resources.split()?;
        let circuit = build(ctx.graph, self.layers, params, ctx.representation)?;

        let statevector = FinalizeMode::Statevector;
        let mode = match ctx.mode {
            FinalizeMode::Expectation(_) => &statevector,
            other => other,
        };

        let output: SimulationOutput<'_> = ctx.simulator.run(&circuit, ctx.scratch, mode)?;
        output
            .most_likely()
            .ok_or_else(|| QcutError::InternalError("readout carries no distribution".into()))
    }
}

// ============================================================================
// Tests
// ============================================================================
