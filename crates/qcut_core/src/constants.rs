//! Constants for QCUT
//!
//! Gantree: L0_Foundation → Constants
//!
//! QAOA defaults, numerical tolerances and reference-run graph settings.

// ============================================================================
// QAOA Defaults
// Gantree: qaoa // QAOA 기본값
// ============================================================================

pub mod qaoa {
    //! Default ansatz and optimizer-loop parameters

    /// Default number of (cost, mixer) layers
    /// Gantree: DEFAULT_LAYERS: usize = 8
    pub const DEFAULT_LAYERS: usize = 8;

    /// Default evaluation budget of the outer loop
    /// Gantree: DEFAULT_MAX_EVALUATIONS: usize = 100
    pub const DEFAULT_MAX_EVALUATIONS: usize = 100;

    /// Tiled seed pair of the reference runs
    /// Gantree: INITIAL_PATTERN: [f64; 2] = [0.5, 1.5]
    pub const INITIAL_PATTERN: [f64; 2] = [0.5, 1.5];

    /// Initial Nelder-Mead simplex edge length
    pub const INITIAL_STEP: f64 = 0.5;

    /// Parameter-space convergence tolerance
    pub const XATOL: f64 = 1e-4;

    /// Objective-value convergence tolerance
    pub const FATOL: f64 = 1e-4;

    /// Number of parameters for `layers` layers
    #[inline]
    pub const fn num_parameters(layers: usize) -> usize {
        2 * layers
    }

    /// Initial parameter vector: `INITIAL_PATTERN` tiled `layers` times.
    ///
    /// The flat vector is then split in halves (γ first), so the γ and β
    /// halves each alternate 0.5/1.5 when `layers > 1`.
    pub fn initial_parameters(layers: usize) -> Vec<f64> {
        INITIAL_PATTERN.repeat(layers)
    }
}

// ============================================================================
// Numerical Tolerances
// Gantree: tolerance // 허용 오차
// ============================================================================

pub mod tolerance {
    //! Tolerances used by validation and tests

    /// Allowed deviation of total probability mass from 1
    pub const PROBABILITY_SUM: f64 = 1e-6;

    /// Agreement between exact (full precision) evaluation paths
    pub const EXACT: f64 = 1e-9;

    /// Agreement between reduced and full precision results
    pub const REDUCED_PRECISION: f64 = 1e-4;
}

// ============================================================================
// Reference Graph Settings
// Gantree: graph // 기준 그래프
// ============================================================================

pub mod graph {
    //! G(n, p) settings of the reference runs

    /// Number of nodes
    pub const DEFAULT_NODES: usize = 15;

    /// Edge probability
    pub const DEFAULT_EDGE_PROBABILITY: f64 = 0.5;

    /// Generator seed
    pub const DEFAULT_SEED: u64 = 42;
}

// ============================================================================
// Tests
// ============================================================================
