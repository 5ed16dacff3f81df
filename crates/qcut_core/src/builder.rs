//! Circuit builder for QCUT
//!
//! Gantree: L1_Circuit → CircuitBuilder
//!
//! Fluent builder for [`CircuitDescription`]s plus the one-call QAOA
//! ansatz constructor used on every evaluation.

use crate::circuit::{CircuitDescription, CostRepresentation, Layer};
use crate::constants::qaoa;
use crate::error::{QcutError, QcutResult};
use crate::graph::Graph;
use crate::types::Angle;

/// Fluent circuit builder (consuming self pattern)
/// Gantree: CircuitBuilder // 빌더 패턴
pub struct CircuitBuilder {
    /// Internal description being built
    /// Gantree: circuit: CircuitDescription // 내부 회로
    circuit: CircuitDescription,
}

impl CircuitBuilder {
    // ========================================================================
    // Constructor
    // ========================================================================

    /// Create a new circuit builder
    /// Gantree: new(n) -> Self // 생성자
    pub fn new(num_qubits: usize) -> Self {
        Self {
            circuit: CircuitDescription::new(num_qubits),
        }
    }

    /// Create with room for `layers` repetitions
    pub fn with_layers(num_qubits: usize, layers: usize) -> Self {
        Self {
            circuit: CircuitDescription::with_capacity(num_qubits, layers),
        }
    }

    /// Set circuit name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.circuit.set_name(name);
        self
    }

    // ========================================================================
    // Layer Operations
    // ========================================================================

    /// Add uniform superposition (H on all qubits)
    /// Gantree: superposition(self) -> Self // H 레이어
    pub fn superposition(mut self) -> Self {
        self.circuit.push(Layer::InitAllSuperposition);
        self
    }

    /// Add cost layer
    /// Gantree: cost(self, γ, rep) -> Self // 비용 레이어
    pub fn cost(mut self, gamma: Angle, representation: CostRepresentation) -> Self {
        self.circuit.push(Layer::Cost {
            gamma,
            representation,
        });
        self
    }

    /// Add QAOA mixer layer (Rx(2β) on all qubits)
    /// Gantree: mixer(self, β) -> Self // 믹서 레이어
    pub fn mixer(mut self, beta: Angle) -> Self {
        self.circuit.push(Layer::Mixer { beta });
        self
    }

    /// Add one (cost, mixer) repetition
    pub fn qaoa_layer(self, gamma: Angle, beta: Angle, representation: CostRepresentation) -> Self {
        self.cost(gamma, representation).mixer(beta)
    }

    // ========================================================================
    // Build
    // ========================================================================

    /// Build and return the description
    /// Gantree: build(self) -> CircuitDescription // 빌드
    pub fn build(self) -> CircuitDescription {
        self.circuit
    }

    /// Build with structure validation
    pub fn build_validated(self) -> QcutResult<CircuitDescription> {
        self.circuit.validate()?;
        Ok(self.circuit)
    }

    /// Get reference to current description
    pub fn circuit(&self) -> &CircuitDescription {
        &self.circuit
    }

    /// Get number of qubits
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }
}

// ============================================================================
// QAOA Ansatz
// ============================================================================

/// Split `[γ_0..γ_{L-1}, β_0..β_{L-1}]` into its halves
pub fn split_parameters(params: &[f64], layers: usize) -> QcutResult<(&[f64], &[f64])> {
    let expected = qaoa::num_parameters(layers);
    if params.len() != expected {
        return Err(QcutError::ParameterLengthMismatch {
            expected,
            actual: params.len(),
        });
    }
    Ok(params.split_at(layers))
}

/// Build the QAOA circuit for `graph` with `layers` repetitions
///
/// Non-finite angles are accepted and flow through to the objective.
/// Gantree: build(graph, L, params, rep) -> Result<CircuitDescription> // 안자츠
pub fn build(
    graph: &Graph,
    layers: usize,
    params: &[f64],
    representation: &CostRepresentation,
) -> QcutResult<CircuitDescription> {
    let (gammas, betas) = split_parameters(params, layers)?;

    let mut builder = CircuitBuilder::with_layers(graph.num_nodes(), layers).superposition();
    for (&gamma, &beta) in gammas.iter().zip(betas) {
        builder = builder.qaoa_layer(gamma, beta, representation.clone());
    }

    Ok(builder.build())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{CostVector, Normalization};
    use std::sync::Arc;

    #[test]
    fn test_builder_basic() {
        let g = Graph::path(3);
        let circuit = CircuitBuilder::new(3)
            .name("path")
            .superposition()
            .qaoa_layer(0.1, 0.2, CostRepresentation::edge_local(&g, Normalization::Full))
            .build_validated()
            .unwrap();

        assert_eq!(circuit.len(), 3);
        assert_eq!(circuit.name(), Some("path"));
        assert_eq!(circuit.count_2q(), 2);
    }

    #[test]
    fn test_build_validated_rejects_dangling_cost() {
        let g = Graph::path(3);
        let result = CircuitBuilder::new(3)
            .superposition()
            .cost(0.1, CostRepresentation::edge_local(&g, Normalization::Full))
            .build_validated();
        assert!(matches!(result, Err(QcutError::MalformedCircuit(_))));
    }

    #[test]
    fn test_build_ansatz() {
        let g = Graph::cycle(4);
        let costs = Arc::new(CostVector::compute(&g, Normalization::Full).unwrap());
        let rep = CostRepresentation::diagonal(costs.clone());

        let circuit = build(&g, 3, &[0.1, 0.2, 0.3, 1.0, 2.0, 3.0], &rep).unwrap();
        assert_eq!(circuit.len(), 7);
        assert!(circuit.validate().is_ok());

        match (&circuit.layers()[1], &circuit.layers()[6]) {
            (
                Layer::Cost {
                    gamma,
                    representation: CostRepresentation::DiagonalPhase(shared),
                },
                Layer::Mixer { beta },
            ) => {
                assert_eq!(*gamma, 0.1);
                assert_eq!(*beta, 3.0);
                assert!(Arc::ptr_eq(shared, &costs));
            }
            other => panic!("unexpected layers {:?}", other),
        }
    }

    #[test]
    fn test_build_rejects_wrong_length() {
        let g = Graph::cycle(4);
        let rep = CostRepresentation::edge_local(&g, Normalization::Full);
        assert_eq!(
            build(&g, 2, &[0.1, 0.2, 0.3], &rep).unwrap_err(),
            QcutError::ParameterLengthMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_build_accepts_nan() {
        let g = Graph::cycle(3);
        let rep = CostRepresentation::edge_local(&g, Normalization::Full);
        assert!(build(&g, 1, &[f64::NAN, 0.0], &rep).is_ok());
    }

    #[test]
    fn test_zero_layers() {
        let g = Graph::cycle(3);
        let rep = CostRepresentation::edge_local(&g, Normalization::Full);
        let circuit = build(&g, 0, &[], &rep).unwrap();
        assert_eq!(circuit.len(), 1);
        assert_eq!(circuit.gate_count(), 3);
    }
}
