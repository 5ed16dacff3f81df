//! Derivative-free optimizer loop for QCUT
//!
//! Gantree: L7_Integration → OptimizerDriver
//!
//! Strategies propose one point at a time and are told its value; the
//! driver owns the evaluation budget, the best-so-far bookkeeping and the
//! history. Strategies never see the simulator, so they are tested against
//! plain closures.

use log::debug;
use qcut_core::{qaoa, ParamVec, QcutResult};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

// ============================================================================
// Strategy Trait
// ============================================================================

/// Propose/observe optimization strategy
/// Gantree: OptimizerStrategy // 제안/관측
pub trait OptimizerStrategy {
    /// Strategy name
    fn name(&self) -> &str;

    /// Next point to evaluate, `None` when the strategy has nothing left
    fn propose(&mut self) -> Option<ParamVec>;

    /// Value of the point returned by the last `propose`
    fn observe(&mut self, value: f64);

    /// Whether the strategy's own stopping test has fired
    fn is_converged(&self) -> bool;
}

/// Ordering key: NaN ranks after every number
#[inline]
fn rank(value: f64) -> f64 {
    if value.is_nan() {
        f64::INFINITY
    } else {
        value
    }
}

// ============================================================================
// Nelder-Mead
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initial { index: usize },
    Reflect,
    Expand,
    ContractOutside,
    ContractInside,
    Shrink { index: usize },
    Done,
}

/// Nelder-Mead simplex search
/// Gantree: NelderMead // 심플렉스
#[derive(Debug, Clone)]
pub struct NelderMead {
    /// Reflection coefficient
    pub alpha: f64,
    /// Expansion coefficient
    pub gamma: f64,
    /// Contraction coefficient
    pub rho: f64,
    /// Shrink coefficient
    pub sigma: f64,
    /// Parameter-space tolerance
    pub xatol: f64,
    /// Objective tolerance
    pub fatol: f64,

    simplex: Vec<ParamVec>,
    values: Vec<f64>,
    centroid: ParamVec,
    reflected: ParamVec,
    reflected_value: f64,
    pending: Option<ParamVec>,
    phase: Phase,
    iterations: usize,
}

impl NelderMead {
    /// Simplex around `initial` with edge length `step` along each axis
    pub fn new(initial: &[f64], step: f64) -> Self {
        let dim = initial.len();
        let mut simplex = Vec::with_capacity(dim + 1);
        simplex.push(initial.to_vec());
        for axis in 0..dim {
            let mut vertex = initial.to_vec();
            vertex[axis] += step;
            simplex.push(vertex);
        }

        Self {
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            xatol: qaoa::XATOL,
            fatol: qaoa::FATOL,
            pending: Some(initial.to_vec()),
            values: vec![f64::NAN; dim + 1],
            centroid: vec![0.0; dim],
            reflected: vec![0.0; dim],
            reflected_value: f64::NAN,
            simplex,
            phase: Phase::Initial { index: 0 },
            iterations: 0,
        }
    }

    /// Set convergence tolerances
    pub fn with_tolerances(mut self, xatol: f64, fatol: f64) -> Self {
        self.xatol = xatol;
        self.fatol = fatol;
        self
    }

    /// Completed simplex iterations
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Current best vertex, once the initial simplex is evaluated
    pub fn best(&self) -> Option<(&[f64], f64)> {
        match self.phase {
            Phase::Initial { .. } => None,
            _ => Some((&self.simplex[0], self.values[0])),
        }
    }

    fn dim(&self) -> usize {
        self.simplex.len() - 1
    }

    fn worst(&self) -> usize {
        self.dim()
    }

    /// `centroid + t·(target - centroid)`
    fn along(&self, target: &[f64], t: f64) -> ParamVec {
        self.centroid
            .iter()
            .zip(target)
            .map(|(c, x)| c + t * (x - c))
            .collect()
    }

    fn replace_worst(&mut self, point: ParamVec, value: f64) {
        let w = self.worst();
        self.simplex[w] = point;
        self.values[w] = value;
    }

    fn is_within_tolerance(&self) -> bool {
        let best = &self.simplex[0];
        let x_ok = self.simplex[1..]
            .iter()
            .flat_map(|v| v.iter().zip(best).map(|(a, b)| (a - b).abs()))
            .all(|d| d <= self.xatol);
        let f_ok = self.values[1..]
            .iter()
            .all(|f| (f - self.values[0]).abs() <= self.fatol);
        x_ok && f_ok
    }

    /// Order the simplex, test convergence, propose the reflection
    fn begin_iteration(&mut self) {
        let mut vertices: Vec<(f64, ParamVec)> = self
            .values
            .drain(..)
            .zip(self.simplex.drain(..))
            .collect();
        vertices.sort_by(|a, b| rank(a.0).total_cmp(&rank(b.0)));
        for (value, vertex) in vertices {
            self.values.push(value);
            self.simplex.push(vertex);
        }

        if self.is_within_tolerance() {
            self.phase = Phase::Done;
            self.pending = None;
            return;
        }

        let dim = self.dim();
        for (i, c) in self.centroid.iter_mut().enumerate() {
            *c = self.simplex[..dim].iter().map(|v| v[i]).sum::<f64>() / dim as f64;
        }

        let worst = self.simplex[dim].clone();
        self.iterations += 1;
        self.phase = Phase::Reflect;
        self.pending = Some(self.along(&worst, -self.alpha));
    }

    fn shrink_vertex(&mut self, index: usize) {
        let best = self.simplex[0].clone();
        for (x, b) in self.simplex[index].iter_mut().zip(&best) {
            *x = b + self.sigma * (*x - b);
        }
        self.phase = Phase::Shrink { index };
        self.pending = Some(self.simplex[index].clone());
    }
}

impl OptimizerStrategy for NelderMead {
    fn name(&self) -> &str {
        "nelder_mead"
    }

    fn propose(&mut self) -> Option<ParamVec> {
        self.pending.clone()
    }

    fn observe(&mut self, value: f64) {
        let Some(point) = self.pending.take() else {
            return;
        };
        let w = self.worst();

        match self.phase {
            Phase::Initial { index } => {
                self.values[index] = value;
                if index < w {
                    self.phase = Phase::Initial { index: index + 1 };
                    self.pending = Some(self.simplex[index + 1].clone());
                } else {
                    self.begin_iteration();
                }
            }
            Phase::Reflect => {
                if rank(value) < rank(self.values[0]) {
                    self.pending = Some(self.along(&point, self.gamma));
                    self.reflected = point;
                    self.reflected_value = value;
                    self.phase = Phase::Expand;
                } else if rank(value) < rank(self.values[w - 1]) {
                    self.replace_worst(point, value);
                    self.begin_iteration();
                } else if rank(value) < rank(self.values[w]) {
                    self.pending = Some(self.along(&point, self.rho));
                    self.reflected = point;
                    self.reflected_value = value;
                    self.phase = Phase::ContractOutside;
                } else {
                    let worst = self.simplex[w].clone();
                    self.pending = Some(self.along(&worst, self.rho));
                    self.phase = Phase::ContractInside;
                }
            }
            Phase::Expand => {
                if rank(value) < rank(self.reflected_value) {
                    self.replace_worst(point, value);
                } else {
                    let reflected = std::mem::take(&mut self.reflected);
                    self.replace_worst(reflected, self.reflected_value);
                    self.reflected = vec![0.0; self.dim()];
                }
                self.begin_iteration();
            }
            Phase::ContractOutside => {
                if rank(value) <= rank(self.reflected_value) {
                    self.replace_worst(point, value);
                    self.begin_iteration();
                } else {
                    self.shrink_vertex(1);
                }
            }
            Phase::ContractInside => {
                if rank(value) < rank(self.values[w]) {
                    self.replace_worst(point, value);
                    self.begin_iteration();
                } else {
                    self.shrink_vertex(1);
                }
            }
            Phase::Shrink { index } => {
                self.values[index] = value;
                if index < w {
                    self.shrink_vertex(index + 1);
                } else {
                    self.begin_iteration();
                }
            }
            Phase::Done => {}
        }
    }

    fn is_converged(&self) -> bool {
        self.phase == Phase::Done
    }
}

// ============================================================================
// Grid Search
// ============================================================================

/// Exhaustive search over `grid^dim`
/// Gantree: GridSearch // 전수 탐색
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: Vec<f64>,
    dim: usize,
    cursor: Option<Vec<usize>>,
}

impl GridSearch {
    /// Same value grid on every axis
    pub fn new(grid: Vec<f64>, dim: usize) -> Self {
        let cursor = if grid.is_empty() && dim > 0 {
            None
        } else {
            Some(vec![0; dim])
        };
        Self { grid, dim, cursor }
    }

    /// `steps` evenly spaced values in `[lo, hi]` on every axis
    pub fn linspace(lo: f64, hi: f64, steps: usize, dim: usize) -> Self {
        let grid = match steps {
            0 => Vec::new(),
            1 => vec![lo],
            _ => (0..steps)
                .map(|i| lo + (hi - lo) * i as f64 / (steps - 1) as f64)
                .collect(),
        };
        Self::new(grid, dim)
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.grid.len().pow(self.dim as u32)
    }

    /// Whether the grid has no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn advance(&mut self) {
        let Some(cursor) = self.cursor.as_mut() else {
            return;
        };
        for digit in cursor.iter_mut() {
            *digit += 1;
            if *digit < self.grid.len() {
                return;
            }
            *digit = 0;
        }
        self.cursor = None;
    }
}

impl OptimizerStrategy for GridSearch {
    fn name(&self) -> &str {
        "grid_search"
    }

    fn propose(&mut self) -> Option<ParamVec> {
        self.cursor
            .as_ref()
            .map(|c| c.iter().map(|&i| self.grid[i]).collect())
    }

    fn observe(&mut self, _value: f64) {
        self.advance();
    }

    fn is_converged(&self) -> bool {
        self.cursor.is_none()
    }
}

// ============================================================================
// Stall Window
// ============================================================================

/// Stops a run whose best value has stopped moving
/// Gantree: StallWindow // 정체 판단
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StallWindow {
    /// Number of evaluations inspected
    pub window: usize,

    /// Improvement below which an evaluation counts as stalled
    pub threshold: f64,

    history: VecDeque<f64>,
}

impl StallWindow {
    /// Create a window of `window` evaluations
    pub fn new(window: usize, threshold: f64) -> Self {
        Self {
            window,
            threshold,
            history: VecDeque::with_capacity(window),
        }
    }

    /// Record the best-value improvement of one evaluation
    pub fn push(&mut self, improvement: f64) {
        self.history.push_back(improvement);
        while self.history.len() > self.window {
            self.history.pop_front();
        }
    }

    /// All recent improvements below threshold
    pub fn check(&self) -> bool {
        self.window > 0
            && self.history.len() == self.window
            && self.history.iter().all(|&d| d.abs() < self.threshold)
    }

    /// Forget history
    pub fn reset(&mut self) {
        self.history.clear();
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Why a run stopped
/// Gantree: OptimizationState // 종료 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptimizationState {
    /// Strategy convergence test fired
    Converged,
    /// Evaluation budget used up
    BudgetExhausted,
    /// Strategy had no more points
    ProposalsExhausted,
    /// Stall window fired
    Stalled,
}

impl fmt::Display for OptimizationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationState::Converged => write!(f, "converged"),
            OptimizationState::BudgetExhausted => write!(f, "budget exhausted"),
            OptimizationState::ProposalsExhausted => write!(f, "proposals exhausted"),
            OptimizationState::Stalled => write!(f, "stalled"),
        }
    }
}

/// One evaluation as seen by the driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// 0-based evaluation index
    pub index: usize,
    /// Evaluated point
    pub params: ParamVec,
    /// Objective value
    pub value: f64,
    /// Best value after this evaluation
    pub best_value: f64,
}

/// Driver options
#[derive(Debug, Clone)]
pub struct MinimizeOptions {
    /// Evaluation budget
    pub max_evaluations: usize,
    /// Optional stall window
    pub stall: Option<StallWindow>,
    /// Keep a per-evaluation history
    pub record_history: bool,
    /// Print progress
    pub verbose: bool,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            max_evaluations: qaoa::DEFAULT_MAX_EVALUATIONS,
            stall: None,
            record_history: true,
            verbose: false,
        }
    }
}

impl MinimizeOptions {
    /// Options with a budget of `max_evaluations`
    pub fn with_budget(max_evaluations: usize) -> Self {
        Self {
            max_evaluations,
            ..Self::default()
        }
    }
}

/// Result of [`minimize`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimizeOutcome {
    /// Best point seen
    pub best_params: ParamVec,
    /// Value at `best_params`
    pub best_value: f64,
    /// Evaluations performed
    pub evaluations: usize,
    /// Whether the strategy converged
    pub converged: bool,
    /// Per-evaluation history
    pub history: Vec<EvaluationRecord>,
    /// Stop reason
    pub state: OptimizationState,
}

/// Run `strategy` against `objective` until it converges, runs dry or the
/// budget is spent. The first objective error aborts the run.
/// Gantree: minimize(strategy, objective, options) -> Result<MinimizeOutcome> // 최소화
pub fn minimize<S, F>(
    strategy: &mut S,
    mut objective: F,
    options: &MinimizeOptions,
) -> QcutResult<MinimizeOutcome>
where
    S: OptimizerStrategy + ?Sized,
    F: FnMut(&[f64]) -> QcutResult<f64>,
{
    let mut best_params: ParamVec = Vec::new();
    let mut best_value = f64::NAN;
    let mut evaluations = 0;
    let mut history = Vec::new();
    let mut stall = options.stall.clone();

    let state = loop {
        if strategy.is_converged() {
            break OptimizationState::Converged;
        }
        if evaluations >= options.max_evaluations {
            break OptimizationState::BudgetExhausted;
        }
        let Some(params) = strategy.propose() else {
            break OptimizationState::ProposalsExhausted;
        };

        let value = objective(&params)?;
        evaluations += 1;
        strategy.observe(value);

        let previous = best_value;
        if evaluations == 1 || rank(value) < rank(best_value) {
            best_value = value;
            best_params.clone_from(&params);
        }

        debug!(
            "[{}] eval {}: value={:.8} best={:.8}",
            strategy.name(),
            evaluations,
            value,
            best_value
        );
        if options.verbose {
            println!("  eval {:>4}: {:+.8} (best {:+.8})", evaluations, value, best_value);
        }

        if options.record_history {
            history.push(EvaluationRecord {
                index: evaluations - 1,
                params,
                value,
                best_value,
            });
        }

        if let Some(window) = stall.as_mut() {
            let improvement = if previous.is_finite() && best_value.is_finite() {
                previous - best_value
            } else {
                f64::INFINITY
            };
            window.push(improvement);
            if window.check() {
                break OptimizationState::Stalled;
            }
        }
    };

    Ok(MinimizeOutcome {
        best_params,
        best_value,
        evaluations,
        converged: state == OptimizationState::Converged,
        history,
        state,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qcut_core::QcutError;

    fn quadratic(x: &[f64]) -> QcutResult<f64> {
        Ok((x[0] - 1.0).powi(2) + 2.0 * (x[1] + 0.5).powi(2))
    }

    #[test]
    fn test_nelder_mead_quadratic() {
        let mut nm = NelderMead::new(&[0.0, 0.0], 0.5).with_tolerances(1e-6, 1e-10);
        let out = minimize(&mut nm, quadratic, &MinimizeOptions::with_budget(1000)).unwrap();

        assert!(out.converged);
        assert_eq!(out.state, OptimizationState::Converged);
        assert_relative_eq!(out.best_params[0], 1.0, epsilon = 1e-4);
        assert_relative_eq!(out.best_params[1], -0.5, epsilon = 1e-4);
        assert!(out.best_value < 1e-8);
    }

    #[test]
    fn test_initial_point_first() {
        let mut nm = NelderMead::new(&[0.5, 1.5], 0.5);
        let out = minimize(&mut nm, quadratic, &MinimizeOptions::with_budget(3)).unwrap();

        assert_eq!(out.history[0].params, vec![0.5, 1.5]);
        assert_eq!(out.history[1].params, vec![1.0, 1.5]);
        assert_eq!(out.history[2].params, vec![0.5, 2.0]);
        assert_eq!(out.state, OptimizationState::BudgetExhausted);
        assert_eq!(out.evaluations, 3);
    }

    #[test]
    fn test_best_never_increases() {
        let mut nm = NelderMead::new(&[2.0, 2.0], 0.5);
        let out = minimize(&mut nm, quadratic, &MinimizeOptions::with_budget(60)).unwrap();
        for pair in out.history.windows(2) {
            assert!(pair[1].best_value <= pair[0].best_value);
        }
        assert_eq!(out.best_value, out.history.last().unwrap().best_value);
    }

    #[test]
    fn test_nan_ranked_worst() {
        // NaN outside the unit disc
        let objective = |x: &[f64]| -> QcutResult<f64> {
            let r2 = x[0] * x[0] + x[1] * x[1];
            Ok(if r2 > 1.0 { f64::NAN } else { r2 })
        };
        let mut nm = NelderMead::new(&[0.5, 0.5], 0.6);
        let out = minimize(&mut nm, objective, &MinimizeOptions::with_budget(200)).unwrap();

        assert!(out.best_value.is_finite());
        assert!(out.best_value < 0.5);
        assert!(out.history.iter().any(|r| r.value.is_nan()));
    }

    #[test]
    fn test_all_nan_runs_to_budget() {
        let mut nm = NelderMead::new(&[0.1, 0.2], 0.5);
        let out = minimize(&mut nm, |_| Ok(f64::NAN), &MinimizeOptions::with_budget(20)).unwrap();
        assert_eq!(out.evaluations, 20);
        assert!(out.best_value.is_nan());
        assert_eq!(out.best_params, vec![0.1, 0.2]);
    }

    #[test]
    fn test_error_aborts() {
        let mut calls = 0;
        let objective = |_: &[f64]| -> QcutResult<f64> {
            calls += 1;
            if calls == 2 {
                Err(QcutError::SimulatorFailure("worker lost".into()))
            } else {
                Ok(1.0)
            }
        };
        let mut nm = NelderMead::new(&[0.0, 0.0], 0.5);
        let err = minimize(&mut nm, objective, &MinimizeOptions::default()).unwrap_err();
        assert!(matches!(err, QcutError::SimulatorFailure(_)));
    }

    #[test]
    fn test_zero_dimensional() {
        let mut nm = NelderMead::new(&[], 0.5);
        let out = minimize(&mut nm, |_| Ok(3.0), &MinimizeOptions::default()).unwrap();
        assert_eq!(out.evaluations, 1);
        assert!(out.converged);
        assert_eq!(out.best_value, 3.0);
    }

    #[test]
    fn test_grid_search() {
        let mut grid = GridSearch::linspace(-1.0, 1.0, 5, 2);
        assert_eq!(grid.len(), 25);

        let out = minimize(&mut grid, quadratic, &MinimizeOptions::with_budget(100)).unwrap();
        assert_eq!(out.evaluations, 25);
        assert_eq!(out.state, OptimizationState::Converged);
        assert_eq!(out.best_params, vec![1.0, -0.5]);
        assert_eq!(out.best_value, 0.0);
    }

    #[test]
    fn test_grid_search_empty() {
        let mut grid = GridSearch::new(Vec::new(), 2);
        assert!(grid.is_empty());
        assert!(grid.propose().is_none());
    }

    #[test]
    fn test_stall_window() {
        let mut window = StallWindow::new(3, 1e-6);
        window.push(0.5);
        window.push(0.0);
        window.push(0.0);
        assert!(!window.check());
        window.push(0.0);
        assert!(window.check());
        window.reset();
        assert!(!window.check());

        let options = MinimizeOptions {
            stall: Some(StallWindow::new(5, 1e-9)),
            ..MinimizeOptions::with_budget(1000)
        };
        let mut nm = NelderMead::new(&[0.0, 0.0], 0.5).with_tolerances(0.0, 0.0);
        let out = minimize(&mut nm, |_| Ok(1.0), &options).unwrap();
        assert_eq!(out.state, OptimizationState::Stalled);
        assert_eq!(out.evaluations, 6);
    }
}
