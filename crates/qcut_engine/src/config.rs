//! Run configuration for QCUT
//!
//! Gantree: L7_Integration → QaoaConfig
//!
//! One serde struct covering the ansatz, simulator placement and optimizer
//! loop. Presets correspond to the reference experiment variants.

use qcut_core::{qaoa, Device, Normalization, Precision, RepresentationKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the evaluator reads the final state
/// Gantree: Readout // statevector/probabilities/expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Readout {
    /// `Σ |ψ_k|²·c_k` over the amplitudes
    Statevector,
    /// `Σ p_k·c_k` over the probability vector
    #[default]
    Probabilities,
    /// Simulator-side diagonal observable
    Expectation,
}

impl Readout {
    /// Parse from string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "statevector" | "amplitudes" => Some(Readout::Statevector),
            "probabilities" | "probs" => Some(Readout::Probabilities),
            "expectation" | "estimator" => Some(Readout::Expectation),
            _ => None,
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readout::Statevector => write!(f, "statevector"),
            Readout::Probabilities => write!(f, "probabilities"),
            Readout::Expectation => write!(f, "expectation"),
        }
    }
}

/// QAOA run configuration
/// Gantree: QaoaConfig // 실행 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaoaConfig {
    // ========================================================================
    // Ansatz
    // ========================================================================
    /// Number of (cost, mixer) layers
    pub layers: usize,

    /// Cost layer form
    pub representation: RepresentationKind,

    /// Cut scale
    pub normalization: Normalization,

    /// Seed pattern tiled to `2·layers` entries
    pub initial_pattern: Vec<f64>,

    // ========================================================================
    // Simulator
    // ========================================================================
    /// Amplitude precision
    pub precision: Precision,

    /// State placement
    pub device: Device,

    /// Final-state readout
    pub readout: Readout,

    /// Upper bound on simulator + cost table bytes
    pub memory_limit: Option<u64>,

    // ========================================================================
    // Optimizer
    // ========================================================================
    /// Evaluation budget
    pub max_evaluations: usize,

    /// Initial simplex edge length
    pub initial_step: f64,

    /// Parameter-space tolerance
    pub xatol: f64,

    /// Objective tolerance
    pub fatol: f64,

    // ========================================================================
    // Execution
    // ========================================================================
    /// Record per-invocation timings
    pub profiling: bool,

    /// Enable verbose output
    pub verbose: bool,
}

impl QaoaConfig {
    // ========================================================================
    // Presets
    // ========================================================================

    /// Diagonal cost layer, exact statevector readout, local f64
    pub fn baseline() -> Self {
        Self {
            layers: qaoa::DEFAULT_LAYERS,
            representation: RepresentationKind::DiagonalPhase,
            normalization: Normalization::Full,
            initial_pattern: qaoa::INITIAL_PATTERN.to_vec(),
            precision: Precision::Full,
            device: Device::Local,
            readout: Readout::Statevector,
            memory_limit: None,
            max_evaluations: qaoa::DEFAULT_MAX_EVALUATIONS,
            initial_step: qaoa::INITIAL_STEP,
            xatol: qaoa::XATOL,
            fatol: qaoa::FATOL,
            profiling: false,
            verbose: false,
        }
    }

    /// Per-edge `rzz` cost layer read through a ZZ observable
    pub fn edge_local() -> Self {
        Self {
            representation: RepresentationKind::EdgeLocalRotations,
            readout: Readout::Expectation,
            ..Self::baseline()
        }
    }

    /// Offloaded f32 state with statevector readout
    pub fn accelerated() -> Self {
        Self {
            precision: Precision::Reduced,
            device: Device::Accelerator,
            readout: Readout::Statevector,
            profiling: true,
            ..Self::baseline()
        }
    }

    /// Offloaded f64 state returning probabilities only
    pub fn memory_optimised() -> Self {
        Self {
            device: Device::Accelerator,
            readout: Readout::Probabilities,
            profiling: true,
            ..Self::baseline()
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "baseline" => Some(Self::baseline()),
            "edge_local" | "edge-local" => Some(Self::edge_local()),
            "accelerated" | "gpu" => Some(Self::accelerated()),
            "memory_optimised" | "memory_optimized" | "memory" => Some(Self::memory_optimised()),
            _ => None,
        }
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set number of layers
    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = layers;
        self
    }

    /// Set evaluation budget
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Set precision
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Set device
    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Set cost layer representation
    pub fn with_representation(mut self, representation: RepresentationKind) -> Self {
        self.representation = representation;
        self
    }

    /// Set readout
    pub fn with_readout(mut self, readout: Readout) -> Self {
        self.readout = readout;
        self
    }

    /// Set normalization
    pub fn with_normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = normalization;
        self
    }

    /// Set initial pattern
    pub fn with_initial_pattern(mut self, pattern: Vec<f64>) -> Self {
        self.initial_pattern = pattern;
        self
    }

    /// Set memory limit in bytes
    pub fn with_memory_limit(mut self, bytes: u64) -> Self {
        self.memory_limit = Some(bytes);
        self
    }

    /// Set convergence tolerances
    pub fn with_tolerances(mut self, xatol: f64, fatol: f64) -> Self {
        self.xatol = xatol;
        self.fatol = fatol;
        self
    }

    /// Set initial simplex step
    pub fn with_initial_step(mut self, step: f64) -> Self {
        self.initial_step = step;
        self
    }

    /// Enable profiling
    pub fn with_profiling(mut self, profiling: bool) -> Self {
        self.profiling = profiling;
        self
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    // ========================================================================
    // Derived Values
    // ========================================================================

    /// Number of optimized parameters
    pub fn num_parameters(&self) -> usize {
        qaoa::num_parameters(self.layers)
    }

    /// Initial point: `initial_pattern` tiled and truncated to `2·layers`
    pub fn initial_parameters(&self) -> Vec<f64> {
        self.initial_pattern
            .iter()
            .copied()
            .cycle()
            .take(self.num_parameters())
            .collect()
    }

    /// Memory limit as the width used by capacity checks
    pub fn memory_limit_bytes(&self) -> Option<u128> {
        self.memory_limit.map(u128::from)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_evaluations == 0 {
            return Err("max_evaluations must be > 0".to_string());
        }

        if self.initial_pattern.is_empty() && self.layers > 0 {
            return Err("initial_pattern must not be empty".to_string());
        }

        if let Some(bad) = self.initial_pattern.iter().find(|x| !x.is_finite()) {
            return Err(format!("initial_pattern entries must be finite, got {}", bad));
        }

        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(format!("initial_step must be > 0, got {}", self.initial_step));
        }

        if !(self.xatol >= 0.0 && self.fatol >= 0.0) {
            return Err(format!(
                "tolerances must be >= 0, got xatol={} fatol={}",
                self.xatol, self.fatol
            ));
        }

        if self.memory_limit == Some(0) {
            return Err("memory_limit must be > 0 when set".to_string());
        }

        Ok(())
    }
}

impl Default for QaoaConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

impl fmt::Display for QaoaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "QaoaConfig(L={}, {}, {}, {}/{}, readout={}, budget={})",
            self.layers,
            self.representation,
            self.normalization,
            self.precision,
            self.device,
            self.readout,
            self.max_evaluations
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline() {
        let config = QaoaConfig::baseline();
        assert_eq!(config.layers, 8);
        assert_eq!(config.max_evaluations, 100);
        assert_eq!(config.normalization, Normalization::Full);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(
            QaoaConfig::edge_local().representation,
            RepresentationKind::EdgeLocalRotations
        );

        let gpu = QaoaConfig::accelerated();
        assert_eq!(gpu.device, Device::Accelerator);
        assert_eq!(gpu.precision, Precision::Reduced);

        let mem = QaoaConfig::memory_optimised();
        assert_eq!(mem.readout, Readout::Probabilities);
        assert_eq!(mem.precision, Precision::Full);

        assert_eq!(QaoaConfig::preset("memory"), Some(mem));
        assert!(QaoaConfig::preset("unknown").is_none());
    }

    #[test]
    fn test_initial_parameters_tiled() {
        let config = QaoaConfig::baseline().with_layers(3);
        assert_eq!(config.initial_parameters(), vec![0.5, 1.5, 0.5, 1.5, 0.5, 1.5]);

        let odd = QaoaConfig::baseline()
            .with_layers(2)
            .with_initial_pattern(vec![0.1, 0.2, 0.3]);
        assert_eq!(odd.initial_parameters(), vec![0.1, 0.2, 0.3, 0.1]);
        assert!(QaoaConfig::baseline().with_layers(0).initial_parameters().is_empty());
    }

    #[test]
    fn test_validation() {
        assert!(QaoaConfig::baseline().with_max_evaluations(0).validate().is_err());
        assert!(QaoaConfig::baseline().with_initial_step(0.0).validate().is_err());
        assert!(QaoaConfig::baseline()
            .with_initial_pattern(vec![f64::NAN])
            .validate()
            .is_err());
        assert!(QaoaConfig::baseline().with_memory_limit(0).validate().is_err());
        assert!(QaoaConfig::baseline().with_tolerances(-1.0, 0.0).validate().is_err());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = QaoaConfig::accelerated().with_memory_limit(1 << 20);
        let json = serde_json::to_string(&config).unwrap();
        let back: QaoaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_display() {
        let s = QaoaConfig::baseline().to_string();
        assert!(s.contains("L=8"));
        assert!(s.contains("diagonal_phase"));
    }

    #[test]
    fn test_readout_parse() {
        assert_eq!(Readout::parse("Probs"), Some(Readout::Probabilities));
        assert_eq!(Readout::parse("estimator"), Some(Readout::Expectation));
        assert_eq!(Readout::parse("x"), None);
    }
}
