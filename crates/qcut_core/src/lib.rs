//! # QCUT Core
//!
//! Graphs, cost tables and layered QAOA circuits for Max-Cut simulation.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qcut_core // L0+L1+Problem: Foundation + Circuit
//!     L0_Foundation // 기반 타입/상수/에러
//!         CoreTypes // 핵심 타입, 2^n 용량 검사
//!         Constants // QAOA 기본값/허용 오차
//!         Errors // 에러 타입
//!     L1_Problem // 문제 정의
//!         Graph // 검증된 그래프
//!         CostModel // 2^n 비용 벡터
//!     L1_Circuit // 회로 구조
//!         Gate // 실행 게이트
//!         CircuitDescription // 레이어 기술
//!         CircuitBuilder // 빌더 + 안자츠
//!         PhaseBuffer // 대각 위상 스크래치
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qcut_core::prelude::*;
//! use std::sync::Arc;
//!
//! let graph = Graph::cycle(4);
//! let costs = Arc::new(CostVector::compute(&graph, Normalization::Full).unwrap());
//! assert_eq!(costs.max_cut(), (0b0101, 4.0));
//!
//! let rep = CostRepresentation::diagonal(costs);
//! let circuit = build(&graph, 2, &[0.5, 0.5, 1.5, 1.5], &rep).unwrap();
//! assert_eq!(circuit.len(), 5);
//! ```
//!
//! ## Edge-Local Export
//!
//! ```rust
//! use qcut_core::prelude::*;
//!
//! let graph = Graph::path(3);
//! let rep = CostRepresentation::edge_local(&graph, Normalization::Full);
//! let circuit = build(&graph, 1, &[0.4, 0.2], &rep).unwrap();
//!
//! assert_eq!(circuit.count_2q(), 2);
//! println!("{}", circuit.to_qasm().unwrap());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Constants (Gantree: L0_Foundation → Constants)
pub mod constants;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Problem graph (Gantree: L1_Problem → Graph)
pub mod graph;

/// Cost vector (Gantree: L1_Problem → CostModel)
pub mod cost;

/// Executable gates (Gantree: L1_Circuit → Gate)
pub mod gate;

/// Layered description (Gantree: L1_Circuit → CircuitDescription)
pub mod circuit;

/// Circuit builder (Gantree: L1_Circuit → CircuitBuilder)
pub mod builder;

/// Phase scratch (Gantree: L1_Circuit → PhaseBuffer)
pub mod phase;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::{build, split_parameters, CircuitBuilder};
pub use circuit::{rzz_angle, CircuitDescription, CostRepresentation, Layer, RepresentationKind};
pub use constants::{qaoa, tolerance};
pub use cost::{cut_value, CostVector, Normalization};
pub use error::{QcutError, QcutResult};
pub use gate::Gate;
pub use graph::{Edge, Graph};
pub use phase::PhaseBuffer;
pub use types::{Angle, Device, NodeId, ParamVec, Precision, QubitId};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qcut_core::prelude::*;
    //! ```

    pub use crate::builder::{build, CircuitBuilder};
    pub use crate::circuit::{CircuitDescription, CostRepresentation, Layer, RepresentationKind};
    pub use crate::constants::{qaoa, tolerance};
    pub use crate::cost::{CostVector, Normalization};
    pub use crate::error::{QcutError, QcutResult};
    pub use crate::gate::Gate;
    pub use crate::graph::{Edge, Graph};
    pub use crate::phase::PhaseBuffer;
    pub use crate::types::{Angle, Device, ParamVec, Precision, QubitId};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::rzz_angle;
    use std::sync::Arc;

    #[test]
    fn test_both_representations_same_structure() {
        let graph = Graph::cycle(5);
        let costs = Arc::new(CostVector::compute(&graph, Normalization::Full).unwrap());
        let params = qaoa::initial_parameters(3);

        let diag = build(&graph, 3, &params, &CostRepresentation::diagonal(costs)).unwrap();
        let edge = build(
            &graph,
            3,
            &params,
            &CostRepresentation::edge_local(&graph, Normalization::Full),
        )
        .unwrap();

        assert_eq!(diag.len(), 1 + 2 * 3);
        assert_eq!(diag.len(), edge.len());
        assert_eq!(diag.count_1q(), edge.count_1q());
        assert_eq!(diag.count_diagonal(), 3);
        assert_eq!(edge.count_2q(), 3 * 5);
    }

    #[test]
    fn test_diagonal_phase_matches_rzz_parity() {
        // Relative phase between odd and even parity must agree in both forms
        let graph = Graph::weighted(2, &[(0, 1, 1.7)]).unwrap();
        let gamma = 0.37;

        for norm in [Normalization::Full, Normalization::Half] {
            let costs = CostVector::compute(&graph, norm).unwrap();
            let mut scratch = PhaseBuffer::new(2).unwrap();
            let phases = scratch.fill(&costs, gamma).unwrap();
            let diag_relative = (phases[1] / phases[0]).arg();

            let theta = rzz_angle(gamma, 1.7, norm);
            // rzz: even → exp(-iθ/2), odd → exp(+iθ/2)
            let rzz_relative = theta;

            assert!((diag_relative - rzz_relative).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_edge_costs() {
        let graph = Graph::unweighted(2, &[(0, 1)]).unwrap();
        let costs = CostVector::compute(&graph, Normalization::Full).unwrap();
        assert_eq!(costs.as_slice(), &[0.0, 1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_initial_parameters_build() {
        let graph = Graph::cycle(4);
        let rep = CostRepresentation::edge_local(&graph, Normalization::Full);
        let params = qaoa::initial_parameters(qaoa::DEFAULT_LAYERS);
        let circuit = build(&graph, qaoa::DEFAULT_LAYERS, &params, &rep).unwrap();
        assert_eq!(circuit.repetitions(), qaoa::DEFAULT_LAYERS);
        assert!(circuit.validate().is_ok());
    }

    #[test]
    fn test_validation_errors_are_early() {
        let err = Graph::unweighted(2, &[(0, 2)]).unwrap_err();
        assert!(err.is_validation_error());
        assert!(!err.is_fatal());
    }
}
