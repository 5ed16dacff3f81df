//! # QCUT Backend
//!
//! Exact simulators behind the QCUT simulator capability set.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qcut_backend // L2: Simulation boundary
//!     SimulatorTrait // reset/apply/finalize
//!     StateVector // f32/f64 버퍼 + 커널
//!     DenseSimulator // 로컬 실행
//!     OffloadSimulator // 워커 스레드 상주 상태
//!     Profiler // 호출별 타이밍
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qcut_backend::prelude::*;
//! use qcut_core::prelude::*;
//! use std::sync::Arc;
//!
//! let graph = Graph::unweighted(2, &[(0, 1)]).unwrap();
//! let costs = Arc::new(CostVector::compute(&graph, Normalization::Full).unwrap());
//! let circuit = build(&graph, 1, &[0.3, 0.2], &CostRepresentation::diagonal(costs.clone())).unwrap();
//!
//! let mut sim = create_simulator(2, Precision::Full, Device::Local, None).unwrap();
//! let mut scratch = PhaseBuffer::new(2).unwrap();
//! let out = sim.run(&circuit, &mut scratch, &FinalizeMode::Probabilities).unwrap();
//! println!("<C> = {:.6}", out.expected_cost(&costs).unwrap());
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Simulator trait and readouts (Gantree: L2_Backend → SimulatorTrait)
pub mod execution;

/// Buffers and kernels (Gantree: L2_Backend → StateVector)
pub mod statevector;

/// Local dense simulator (Gantree: L2_Backend → DenseSimulator)
pub mod simulator;

/// Worker-resident simulator (Gantree: L2_Backend → OffloadSimulator)
pub mod offload;

/// Invocation timing (Gantree: L2_Backend → Profiler)
pub mod profile;

// ============================================================================
// Re-exports
// ============================================================================

pub use execution::{FinalizeMode, Observable, SimulationOutput, Simulator, ZzTerm};
pub use offload::OffloadSimulator;
pub use profile::{InvocationTiming, Profiler, TimingSummary};
pub use simulator::{create_simulator, DenseSimulator};
pub use statevector::{ProbBuffer, StateBuffer};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qcut_backend::prelude::*;
    //! ```

    pub use crate::execution::{FinalizeMode, Observable, SimulationOutput, Simulator};
    pub use crate::offload::OffloadSimulator;
    pub use crate::profile::{InvocationTiming, Profiler};
    pub use crate::simulator::{create_simulator, DenseSimulator};
    pub use crate::statevector::{ProbBuffer, StateBuffer};
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qcut_core::prelude::*;
    use qcut_core::tolerance;
    use std::f64::consts::FRAC_PI_4;
    use std::sync::Arc;

    fn expected_cost(
        graph: &Graph,
        costs: &Arc<CostVector>,
        rep: &CostRepresentation,
        params: &[f64],
        precision: Precision,
        device: Device,
        mode: &FinalizeMode,
    ) -> f64 {
        let layers = params.len() / 2;
        let circuit = build(graph, layers, params, rep).unwrap();
        let mut sim = create_simulator(graph.num_nodes(), precision, device, None).unwrap();
        let mut scratch = PhaseBuffer::new(graph.num_nodes()).unwrap();
        let out = sim.run(&circuit, &mut scratch, mode).unwrap();
        out.expected_cost(costs).unwrap()
    }

    fn distribution(graph: &Graph, rep: &CostRepresentation, params: &[f64]) -> Vec<f64> {
        let circuit = build(graph, params.len() / 2, params, rep).unwrap();
        let mut sim = DenseSimulator::ideal(graph.num_nodes()).unwrap();
        let mut scratch = PhaseBuffer::new(graph.num_nodes()).unwrap();
        match sim.run(&circuit, &mut scratch, &FinalizeMode::Probabilities).unwrap() {
            SimulationOutput::Probabilities(p) => (0..p.len()).map(|k| p.get(k).unwrap()).collect(),
            _ => panic!("expected probabilities"),
        }
    }

    #[test]
    fn test_representations_identical_distributions() {
        let graph = Graph::weighted(
            5,
            &[(0, 1, 1.0), (1, 2, 0.7), (2, 3, 1.3), (3, 4, 1.0), (4, 0, 2.0), (1, 3, 0.4)],
        )
        .unwrap();
        let params = [0.8, 0.35, 1.2, 0.45, 0.9, 0.1];

        for norm in [Normalization::Full, Normalization::Half] {
            let costs = Arc::new(CostVector::compute(&graph, norm).unwrap());
            let diag = distribution(&graph, &CostRepresentation::diagonal(costs), &params);
            let edge = distribution(&graph, &CostRepresentation::edge_local(&graph, norm), &params);
            for (a, b) in diag.iter().zip(&edge) {
                assert!((a - b).abs() < tolerance::EXACT, "{} vs {}", a, b);
            }
            let total: f64 = diag.iter().sum();
            assert!((total - 1.0).abs() < tolerance::PROBABILITY_SUM);
        }
    }

    #[test]
    fn test_single_edge_quarter_pi() {
        let graph = Graph::unweighted(2, &[(0, 1)]).unwrap();
        let costs = Arc::new(CostVector::compute(&graph, Normalization::Full).unwrap());
        let rep = CostRepresentation::edge_local(&graph, Normalization::Full);
        let value = expected_cost(
            &graph,
            &costs,
            &rep,
            &[FRAC_PI_4, FRAC_PI_4],
            Precision::Full,
            Device::Local,
            &FinalizeMode::Statevector,
        );
        assert!((value - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_four_cycle_zero_angles() {
        let graph = Graph::cycle(4);
        for (norm, expected) in [(Normalization::Full, 2.0), (Normalization::Half, 1.0)] {
            let costs = Arc::new(CostVector::compute(&graph, norm).unwrap());
            let rep = CostRepresentation::diagonal(costs.clone());
            let value = expected_cost(
                &graph,
                &costs,
                &rep,
                &[0.0, 0.0],
                Precision::Full,
                Device::Local,
                &FinalizeMode::Probabilities,
            );
            assert!((value - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reduced_precision_and_offload() {
        let graph = Graph::complete(5);
        let costs = Arc::new(CostVector::compute(&graph, Normalization::Full).unwrap());
        let rep = CostRepresentation::diagonal(costs.clone());
        let params = qaoa::initial_parameters(3);
        let mode = FinalizeMode::Probabilities;

        let full = expected_cost(&graph, &costs, &rep, &params, Precision::Full, Device::Local, &mode);
        let reduced = expected_cost(&graph, &costs, &rep, &params, Precision::Reduced, Device::Local, &mode);
        let offload = expected_cost(&graph, &costs, &rep, &params, Precision::Full, Device::Accelerator, &mode);

        assert!((full - reduced).abs() < tolerance::REDUCED_PRECISION);
        assert!((full - offload).abs() < tolerance::EXACT);
    }

    #[test]
    fn test_expectation_readout_matches_probabilities() {
        let graph = Graph::path(4);
        let costs = Arc::new(CostVector::compute(&graph, Normalization::Half).unwrap());
        let rep = CostRepresentation::edge_local(&graph, Normalization::Half);
        let params = [0.5, 1.5];

        let probs = expected_cost(&graph, &costs, &rep, &params, Precision::Full, Device::Local, &FinalizeMode::Probabilities);
        let diag = expected_cost(
            &graph,
            &costs,
            &rep,
            &params,
            Precision::Full,
            Device::Local,
            &FinalizeMode::Expectation(Observable::Diagonal(costs.clone())),
        );
        let zz = expected_cost(
            &graph,
            &costs,
            &rep,
            &params,
            Precision::Full,
            Device::Local,
            &FinalizeMode::Expectation(Observable::maxcut(&graph, Normalization::Half)),
        );
        assert!((probs - diag).abs() < 1e-12);
        assert!((probs - zz).abs() < 1e-12);
    }

    #[test]
    fn test_global_phase_invariance() {
        let graph = Graph::cycle(4);
        let costs = Arc::new(CostVector::compute(&graph, Normalization::Full).unwrap());
        let circuit = build(&graph, 1, &[0.7, 0.3], &CostRepresentation::diagonal(costs.clone())).unwrap();
        let global = vec![num_complex::Complex64::from_polar(1.0, 1.234); 16];

        let mut values = Vec::new();
        for phase in [None, Some(Gate::Diagonal(&global))] {
            let mut sim = DenseSimulator::ideal(4).unwrap();
            let mut scratch = PhaseBuffer::new(4).unwrap();
            sim.reset().unwrap();
            circuit.for_each_gate(&mut scratch, |gate| sim.apply(gate)).unwrap();
            if let Some(gate) = phase {
                sim.apply(&gate).unwrap();
            }
            for mode in [FinalizeMode::Statevector, FinalizeMode::Probabilities] {
                values.push(sim.finalize(&mode).unwrap().expected_cost(&costs).unwrap());
            }
        }

        for v in &values[1..] {
            assert!((v - values[0]).abs() < 1e-12);
        }
    }
}
