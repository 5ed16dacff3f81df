//! Simulator capability set
//!
//! Gantree: L2_Backend → SimulatorTrait
//!
//! The boundary between circuit construction and simulation. A simulator is
//! reset, fed lowered gates in order and finalized into one of three
//! readouts. Outputs borrow the simulator's own buffers.

use crate::statevector::{ProbBuffer, StateBuffer};
use qcut_core::{
    CircuitDescription, CostVector, Device, Gate, Graph, Normalization, PhaseBuffer, Precision,
    QcutError, QcutResult,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Observables
// ============================================================================

/// One `coeff · Z_u Z_v` term
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZzTerm {
    /// First qubit
    pub u: usize,
    /// Second qubit
    pub v: usize,
    /// Coefficient
    pub coeff: f64,
}

/// Diagonal observable evaluated on the final state
/// Gantree: Observable // 대각 관측량
#[derive(Debug, Clone, PartialEq)]
pub enum Observable {
    /// Value `c_k` on basis state `k`
    Diagonal(Arc<CostVector>),
    /// `offset + Σ coeff · Z_u Z_v`
    ZzSum {
        /// Register width
        num_qubits: usize,
        /// Identity coefficient
        offset: f64,
        /// Pauli-ZZ terms
        terms: Vec<ZzTerm>,
    },
}

impl Observable {
    /// Cut operator `Σ w·s·(1 - Z_u Z_v)/2` for `graph`
    /// Gantree: maxcut(graph, norm) -> Observable // 컷 연산자
    pub fn maxcut(graph: &Graph, normalization: Normalization) -> Self {
        let scale = normalization.scale();
        let terms: Vec<ZzTerm> = graph
            .edges()
            .iter()
            .map(|e| ZzTerm {
                u: e.u,
                v: e.v,
                coeff: -e.weight * scale / 2.0,
            })
            .collect();
        let offset = graph.total_weight() * scale / 2.0;

        Observable::ZzSum {
            num_qubits: graph.num_nodes(),
            offset,
            terms,
        }
    }

    /// Register width the observable acts on
    pub fn num_qubits(&self) -> usize {
        match self {
            Observable::Diagonal(costs) => costs.num_qubits(),
            Observable::ZzSum { num_qubits, .. } => *num_qubits,
        }
    }

    /// Eigenvalue on basis state `k`
    pub fn value(&self, k: usize) -> f64 {
        match self {
            Observable::Diagonal(costs) => costs.get(k).unwrap_or(f64::NAN),
            Observable::ZzSum { offset, terms, .. } => {
                offset
                    + terms
                        .iter()
                        .map(|t| {
                            let parity = bit(k, t.u) ^ bit(k, t.v);
                            if parity == 1 {
                                -t.coeff
                            } else {
                                t.coeff
                            }
                        })
                        .sum::<f64>()
            }
        }
    }

    /// Expectation under the amplitudes in `state`
    pub fn expectation(&self, state: &StateBuffer) -> QcutResult<f64> {
        let width = state.len().trailing_zeros() as usize;
        if self.num_qubits() != width {
            return Err(QcutError::ObservableMismatch {
                expected: width,
                actual: self.num_qubits(),
            });
        }

        match self {
            Observable::Diagonal(costs) => state.expectation(costs),
            Observable::ZzSum { terms, .. } => {
                if let Some(qubit) = terms.iter().map(|t| t.u.max(t.v)).find(|&q| q >= width) {
                    return Err(QcutError::GateQubitMismatch {
                        qubit,
                        num_qubits: width,
                    });
                }
                Ok(state.expectation_with(|k| self.value(k)))
            }
        }
    }
}

/// Bit `q` of `k`; qubits past the word width read as 0
fn bit(k: usize, q: usize) -> usize {
    u32::try_from(q)
        .ok()
        .and_then(|q| k.checked_shr(q))
        .map_or(0, |shifted| shifted & 1)
}

// ============================================================================
// Finalize Mode / Output
// ============================================================================

/// What `finalize` produces
/// Gantree: FinalizeMode // statevector/probabilities/expectation
#[derive(Debug, Clone, PartialEq)]
pub enum FinalizeMode {
    /// Full amplitude sequence
    Statevector,
    /// Squared magnitudes only
    Probabilities,
    /// Scalar expectation of a diagonal observable
    Expectation(Observable),
}

impl FinalizeMode {
    /// Mode name
    pub fn name(&self) -> &'static str {
        match self {
            FinalizeMode::Statevector => "statevector",
            FinalizeMode::Probabilities => "probabilities",
            FinalizeMode::Expectation(_) => "expectation",
        }
    }
}

/// Borrowed simulation result
/// Gantree: SimulationOutput<'a> // 차용 뷰
#[derive(Debug, Clone, Copy)]
pub enum SimulationOutput<'a> {
    /// View of the amplitudes
    Statevector(&'a StateBuffer),
    /// View of the probabilities
    Probabilities(&'a ProbBuffer),
    /// Scalar expectation
    Expectation(f64),
}

impl SimulationOutput<'_> {
    /// Expected cost under this output
    ///
    /// Expectation outputs are returned as computed by the simulator.
    pub fn expected_cost(&self, costs: &CostVector) -> QcutResult<f64> {
        match self {
            SimulationOutput::Statevector(state) => state.expectation(costs),
            SimulationOutput::Probabilities(probs) => probs.expectation(costs),
            SimulationOutput::Expectation(value) => Ok(*value),
        }
    }

    /// Total probability mass, if the output carries a distribution
    pub fn total_probability(&self) -> Option<f64> {
        match self {
            SimulationOutput::Statevector(state) => Some(state.total_probability()),
            SimulationOutput::Probabilities(probs) => Some(probs.sum()),
            SimulationOutput::Expectation(_) => None,
        }
    }

    /// Most likely assignment, if the output carries a distribution
    pub fn most_likely(&self) -> Option<(usize, f64)> {
        match self {
            SimulationOutput::Statevector(state) => {
                let mut best: Option<(usize, f64)> = None;
                for k in 0..state.len() {
                    let p = state.probability(k).unwrap_or(f64::NAN);
                    if best.map_or(true, |(_, b)| p > b) {
                        best = Some((k, p));
                    }
                }
                best
            }
            SimulationOutput::Probabilities(probs) => probs.argmax(),
            SimulationOutput::Expectation(_) => None,
        }
    }
}

// ============================================================================
// Simulator Trait
// ============================================================================

/// Exact circuit simulator
/// Gantree: SimulatorTrait // 시뮬레이터 인터페이스
pub trait Simulator: Send {
    /// Get simulator name
    fn name(&self) -> &str;

    /// Register width
    fn num_qubits(&self) -> usize;

    /// Amplitude precision
    fn precision(&self) -> Precision;

    /// Where the state lives
    fn device(&self) -> Device {
        Device::Local
    }

    /// Whether results are exact (no shot sampling)
    fn is_exact(&self) -> bool {
        true
    }

    /// Back to `|0…0⟩`
    /// Gantree: reset() -> Result // 초기화
    fn reset(&mut self) -> QcutResult<()>;

    /// Apply one lowered gate
    /// Gantree: apply(gate) -> Result // 게이트 적용
    fn apply(&mut self, gate: &Gate<'_>) -> QcutResult<()>;

    /// Produce the requested readout
    /// Gantree: finalize(mode) -> Result<SimulationOutput> // 결과
    fn finalize(&mut self, mode: &FinalizeMode) -> QcutResult<SimulationOutput<'_>>;

    /// Heap bytes held by state and output buffers
    fn memory_bytes(&self) -> usize;

    /// Drop state and output buffers
    fn release(&mut self);

    /// Reset, apply every gate of `circuit` in order, finalize
    /// Gantree: run(circuit, scratch, mode) -> Result<SimulationOutput> // 실행
    fn run(
        &mut self,
        circuit: &CircuitDescription,
        scratch: &mut PhaseBuffer,
        mode: &FinalizeMode,
    ) -> QcutResult<SimulationOutput<'_>> {
        if circuit.num_qubits() != self.num_qubits() {
            return Err(QcutError::MalformedCircuit(format!(
                "circuit has {} qubits, simulator has {}",
                circuit.num_qubits(),
                self.num_qubits()
            )));
        }

        self.reset()?;
        circuit.for_each_gate(scratch, |gate| self.apply(gate))?;
        self.finalize(mode)
    }
}

impl fmt::Debug for dyn Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("name", &self.name())
            .field("num_qubits", &self.num_qubits())
            .field("precision", &self.precision())
            .field("device", &self.device())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maxcut_observable_matches_costs() {
        let graph = Graph::weighted(3, &[(0, 1, 1.0), (1, 2, 2.0), (0, 2, 0.5)]).unwrap();
        for norm in [Normalization::Full, Normalization::Half] {
            let costs = CostVector::compute(&graph, norm).unwrap();
            let obs = Observable::maxcut(&graph, norm);
            assert_eq!(obs.num_qubits(), 3);
            for k in 0..8 {
                assert!((obs.value(k) - costs[k]).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_observable_mismatch() {
        let obs = Observable::maxcut(&Graph::cycle(3), Normalization::Full);
        let state = StateBuffer::zeros(2, Precision::Full, None).unwrap();
        assert_eq!(
            obs.expectation(&state).unwrap_err(),
            QcutError::ObservableMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn test_zz_term_outside_register() {
        let obs = Observable::ZzSum {
            num_qubits: 2,
            offset: 0.5,
            terms: vec![ZzTerm {
                u: 0,
                v: 64,
                coeff: 1.0,
            }],
        };
        let state = StateBuffer::zeros(2, Precision::Full, None).unwrap();
        assert_eq!(
            obs.expectation(&state).unwrap_err(),
            QcutError::GateQubitMismatch {
                qubit: 64,
                num_qubits: 2
            }
        );
        // Out-of-word qubits read as 0 instead of overflowing the shift
        assert_eq!(obs.value(0b1), -0.5);
    }

    #[test]
    fn test_output_expected_cost() {
        let graph = Graph::unweighted(2, &[(0, 1)]).unwrap();
        let costs = CostVector::compute(&graph, Normalization::Full).unwrap();
        let mut state = StateBuffer::zeros(2, Precision::Full, None).unwrap();
        state.apply(&Gate::H(0));

        let out = SimulationOutput::Statevector(&state);
        assert!((out.expected_cost(&costs).unwrap() - 0.5).abs() < 1e-12);
        assert!((out.total_probability().unwrap() - 1.0).abs() < 1e-12);
        // Tie between |00⟩ and |01⟩ resolves to the lower index
        assert_eq!(out.most_likely().map(|(k, _)| k), Some(0));

        let scalar = SimulationOutput::Expectation(1.25);
        assert_eq!(scalar.expected_cost(&costs).unwrap(), 1.25);
        assert!(scalar.most_likely().is_none());
    }

    #[test]
    fn test_finalize_mode_name() {
        assert_eq!(FinalizeMode::Probabilities.name(), "probabilities");
        let obs = Observable::maxcut(&Graph::cycle(3), Normalization::Full);
        assert_eq!(FinalizeMode::Expectation(obs).name(), "expectation");
    }
}
