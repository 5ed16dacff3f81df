//! Layered circuit description for QCUT
//!
//! Gantree: L1_Circuit → CircuitDescription
//!
//! A QAOA circuit is kept as logical layers (superposition, cost, mixer) and
//! lowered to [`Gate`]s on demand. Cost layers hold `Arc` handles, so a
//! description is cheap to rebuild for every parameter vector.

use crate::cost::{CostVector, Normalization};
use crate::error::{QcutError, QcutResult};
use crate::gate::Gate;
use crate::graph::{Edge, Graph};
use crate::phase::PhaseBuffer;
use crate::types::Angle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Cost Representation
// ============================================================================

/// Which form a cost layer takes
/// Gantree: RepresentationKind // diagonal/edge-local
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RepresentationKind {
    /// One full-register diagonal built from the cost vector
    #[default]
    DiagonalPhase,
    /// One `rzz` per edge
    EdgeLocalRotations,
}

impl RepresentationKind {
    /// Parse from string ("diagonal", "edge"/"rzz")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "diagonal" | "diagonal_phase" => Some(RepresentationKind::DiagonalPhase),
            "edge" | "edge_local" | "rzz" => Some(RepresentationKind::EdgeLocalRotations),
            _ => None,
        }
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepresentationKind::DiagonalPhase => write!(f, "diagonal_phase"),
            RepresentationKind::EdgeLocalRotations => write!(f, "edge_local_rotations"),
        }
    }
}

/// Cost layer payload
/// Gantree: CostRepresentation // Arc 핸들
#[derive(Debug, Clone, PartialEq)]
pub enum CostRepresentation {
    /// `exp(-iγ·c_k)` on amplitude `k`
    DiagonalPhase(Arc<CostVector>),
    /// `rzz(u, v, -γ·w·s)` per edge
    EdgeLocalRotations {
        /// Graph edges
        edges: Arc<[Edge]>,
        /// Cut scale `s`
        normalization: Normalization,
    },
}

impl CostRepresentation {
    /// Diagonal form over a shared cost vector
    pub fn diagonal(costs: Arc<CostVector>) -> Self {
        CostRepresentation::DiagonalPhase(costs)
    }

    /// Edge-local form for `graph`
    pub fn edge_local(graph: &Graph, normalization: Normalization) -> Self {
        CostRepresentation::EdgeLocalRotations {
            edges: graph.edges().into(),
            normalization,
        }
    }

    /// Kind of this representation
    pub fn kind(&self) -> RepresentationKind {
        match self {
            CostRepresentation::DiagonalPhase(_) => RepresentationKind::DiagonalPhase,
            CostRepresentation::EdgeLocalRotations { .. } => RepresentationKind::EdgeLocalRotations,
        }
    }
}

/// `rzz` angle for an edge of weight `w` in a cost layer with angle `γ`
///
/// The cut operator is `C = Σ w·s·(1 - Z_u Z_v)/2`, so the ZZ coefficient is
/// `J = -w·s/2` and `exp(-iγC)` equals `Π rzz(2γJ)` up to a global phase.
#[inline]
pub fn rzz_angle(gamma: Angle, weight: f64, normalization: Normalization) -> Angle {
    let coupling = -weight * normalization.scale() / 2.0;
    2.0 * gamma * coupling
}

// ============================================================================
// Layers
// ============================================================================

/// Logical circuit layer
/// Gantree: Layer // 논리 레이어
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// H on every qubit
    InitAllSuperposition,
    /// Cost unitary `exp(-iγC)`
    Cost {
        /// Cost angle
        gamma: Angle,
        /// Payload
        representation: CostRepresentation,
    },
    /// `Rx(2β)` on every qubit
    Mixer {
        /// Mixer angle
        beta: Angle,
    },
}

impl Layer {
    /// Layer name
    pub fn name(&self) -> &'static str {
        match self {
            Layer::InitAllSuperposition => "init",
            Layer::Cost { .. } => "cost",
            Layer::Mixer { .. } => "mixer",
        }
    }
}

// ============================================================================
// Circuit Description
// ============================================================================

/// Ordered layer sequence for one parameter vector
/// Gantree: CircuitDescription // 회로 기술
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitDescription {
    /// Number of qubits
    /// Gantree: num_qubits: usize // 큐비트 수
    num_qubits: usize,

    /// Layer sequence
    /// Gantree: layers: Vec<Layer> // 레이어 목록
    layers: Vec<Layer>,

    /// Optional circuit name
    name: Option<String>,
}

impl CircuitDescription {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an empty description
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            layers: Vec::new(),
            name: None,
        }
    }

    /// Create with reserved room for `layers` QAOA repetitions
    pub fn with_capacity(num_qubits: usize, layers: usize) -> Self {
        Self {
            num_qubits,
            layers: Vec::with_capacity(1 + 2 * layers),
            name: None,
        }
    }

    /// Append a layer
    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Set circuit name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Layer sequence
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Number of logical layers (1 + 2L when well formed)
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if there are no layers
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of (cost, mixer) repetitions
    pub fn repetitions(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| matches!(l, Layer::Cost { .. }))
            .count()
    }

    /// Circuit name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check the `Init, (Cost, Mixer)*` structure and payload sizes
    /// Gantree: validate(&self) -> Result // 구조 검증
    pub fn validate(&self) -> QcutResult<()> {
        let mut layers = self.layers.iter();

        match layers.next() {
            Some(Layer::InitAllSuperposition) => {}
            Some(other) => {
                return Err(QcutError::MalformedCircuit(format!(
                    "first layer is '{}', expected 'init'",
                    other.name()
                )))
            }
            None => return Err(QcutError::MalformedCircuit("no layers".into())),
        }

        let mut position = 1;
        while let Some(layer) = layers.next() {
            match layer {
                Layer::Cost { representation, .. } => self.validate_cost(representation)?,
                other => {
                    return Err(QcutError::MalformedCircuit(format!(
                        "layer {} is '{}', expected 'cost'",
                        position,
                        other.name()
                    )))
                }
            }

            match layers.next() {
                Some(Layer::Mixer { .. }) => {}
                Some(other) => {
                    return Err(QcutError::MalformedCircuit(format!(
                        "layer {} is '{}', expected 'mixer'",
                        position + 1,
                        other.name()
                    )))
                }
                None => {
                    return Err(QcutError::MalformedCircuit(
                        "cost layer without mixer".into(),
                    ))
                }
            }
            position += 2;
        }

        Ok(())
    }

    fn validate_cost(&self, representation: &CostRepresentation) -> QcutResult<()> {
        match representation {
            CostRepresentation::DiagonalPhase(costs) => {
                if costs.num_qubits() != self.num_qubits {
                    return Err(QcutError::DiagonalLengthMismatch {
                        expected: crate::types::dimension(self.num_qubits)?,
                        actual: costs.len(),
                    });
                }
            }
            CostRepresentation::EdgeLocalRotations { edges, .. } => {
                for edge in edges.iter() {
                    for qubit in [edge.u, edge.v] {
                        if qubit >= self.num_qubits {
                            return Err(QcutError::GateQubitMismatch {
                                qubit,
                                num_qubits: self.num_qubits,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Lowering
    // ========================================================================

    /// Lower every layer to gates, in order
    ///
    /// Diagonal cost layers are written into `scratch` and passed as a
    /// borrowed [`Gate::Diagonal`]; the callback must not keep the gate.
    /// Gantree: for_each_gate(&self, scratch, f) -> Result // 게이트 전개
    pub fn for_each_gate<F>(&self, scratch: &mut PhaseBuffer, mut f: F) -> QcutResult<()>
    where
        F: FnMut(&Gate<'_>) -> QcutResult<()>,
    {
        self.lower(Some(scratch), &mut f)
    }

    fn lower<F>(&self, mut scratch: Option<&mut PhaseBuffer>, f: &mut F) -> QcutResult<()>
    where
        F: FnMut(&Gate<'_>) -> QcutResult<()>,
    {
        let n = self.num_qubits;

        for layer in &self.layers {
            match layer {
                Layer::InitAllSuperposition => {
                    for q in 0..n {
                        f(&Gate::H(q))?;
                    }
                }
                Layer::Cost {
                    gamma,
                    representation,
                } => match representation {
                    CostRepresentation::DiagonalPhase(costs) => match scratch.as_deref_mut() {
                        Some(buffer) => {
                            let phases = buffer.fill(costs, *gamma)?;
                            f(&Gate::Diagonal(phases))?;
                        }
                        // Structure-only walk (counting, export)
                        None => f(&Gate::Diagonal(&[]))?,
                    },
                    CostRepresentation::EdgeLocalRotations {
                        edges,
                        normalization,
                    } => {
                        for edge in edges.iter() {
                            let theta = rzz_angle(*gamma, edge.weight, *normalization);
                            f(&Gate::Rzz(edge.u, edge.v, theta))?;
                        }
                    }
                },
                Layer::Mixer { beta } => {
                    for q in 0..n {
                        f(&Gate::Rx(q, 2.0 * beta))?;
                    }
                }
            }
        }

        Ok(())
    }

    fn count_where(&self, pred: impl Fn(&Gate<'_>) -> bool) -> usize {
        let mut count = 0;
        let _ = self.lower(None, &mut |gate: &Gate<'_>| {
            if pred(gate) {
                count += 1;
            }
            Ok(())
        });
        count
    }

    // ========================================================================
    // Circuit Analysis
    // ========================================================================

    /// Total number of lowered gates
    /// Gantree: gate_count(&self) -> usize // 게이트 수
    pub fn gate_count(&self) -> usize {
        self.count_where(|_| true)
    }

    /// Count single-qubit gates
    pub fn count_1q(&self) -> usize {
        self.count_where(|g| g.is_single_qubit())
    }

    /// Count two-qubit gates
    /// Gantree: count_2q(&self) -> usize // 2Q 수
    pub fn count_2q(&self) -> usize {
        self.count_where(|g| g.is_two_qubit())
    }

    /// Count full-register diagonals
    pub fn count_diagonal(&self) -> usize {
        self.count_where(|g| matches!(g, Gate::Diagonal(_)))
    }

    /// Longest gate path, full-register diagonals touching every qubit
    /// Gantree: depth(&self) -> usize // 깊이 계산
    pub fn depth(&self) -> usize {
        let mut qubit_depths = vec![0usize; self.num_qubits];

        let _ = self.lower(None, &mut |gate: &Gate<'_>| {
            let qubits = gate.qubits();
            if qubits.is_empty() {
                let max_depth = qubit_depths.iter().copied().max().unwrap_or(0);
                for d in qubit_depths.iter_mut() {
                    *d = max_depth + 1;
                }
            } else {
                let max_depth = qubits
                    .iter()
                    .filter_map(|&q| qubit_depths.get(q))
                    .copied()
                    .max()
                    .unwrap_or(0);
                for &q in &qubits {
                    if let Some(d) = qubit_depths.get_mut(q) {
                        *d = max_depth + 1;
                    }
                }
            }
            Ok(())
        });

        qubit_depths.into_iter().max().unwrap_or(0)
    }

    // ========================================================================
    // QASM Conversion
    // ========================================================================

    /// Convert to OpenQASM 2.0; diagonal-phase circuits are not expressible
    /// Gantree: to_qasm(&self) -> Result<String> // QASM2 출력
    pub fn to_qasm(&self) -> QcutResult<String> {
        let mut lines = vec![
            "OPENQASM 2.0;".to_string(),
            "include \"qelib1.inc\";".to_string(),
            String::new(),
            format!("qreg q[{}];", self.num_qubits),
            format!("creg c[{}];", self.num_qubits),
            String::new(),
        ];

        self.lower(None, &mut |gate: &Gate<'_>| {
            lines.push(gate.to_qasm()?);
            Ok(())
        })?;

        Ok(lines.join("\n"))
    }
}

impl fmt::Display for CircuitDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layers: Vec<&str> = self.layers.iter().map(|l| l.name()).collect();
        write!(
            f,
            "CircuitDescription({}, qubits={}, layers=[{}])",
            self.name.as_deref().unwrap_or("unnamed"),
            self.num_qubits,
            layers.join(", ")
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Graph, Arc<CostVector>) {
        let g = Graph::cycle(3);
        let costs = Arc::new(CostVector::compute(&g, Normalization::Full).unwrap());
        (g, costs)
    }

    fn description(rep: CostRepresentation, reps: usize) -> CircuitDescription {
        let mut c = CircuitDescription::with_capacity(3, reps);
        c.push(Layer::InitAllSuperposition);
        for _ in 0..reps {
            c.push(Layer::Cost {
                gamma: 0.3,
                representation: rep.clone(),
            });
            c.push(Layer::Mixer { beta: 0.2 });
        }
        c
    }

    #[test]
    fn test_rzz_angle() {
        assert_eq!(rzz_angle(0.5, 1.0, Normalization::Full), -0.5);
        assert_eq!(rzz_angle(0.5, 2.0, Normalization::Half), -0.5);
    }

    #[test]
    fn test_counts_diagonal() {
        let (_, costs) = triangle();
        let c = description(CostRepresentation::diagonal(costs), 2);
        assert!(c.validate().is_ok());
        assert_eq!(c.len(), 5);
        assert_eq!(c.repetitions(), 2);
        // 3 H + 2 × (1 diagonal + 3 Rx)
        assert_eq!(c.gate_count(), 11);
        assert_eq!(c.count_diagonal(), 2);
        assert_eq!(c.count_2q(), 0);
        assert_eq!(c.depth(), 5);
    }

    #[test]
    fn test_counts_edge_local() {
        let (g, _) = triangle();
        let c = description(CostRepresentation::edge_local(&g, Normalization::Full), 1);
        assert_eq!(c.len(), 3);
        assert_eq!(c.count_2q(), 3);
        assert_eq!(c.count_1q(), 6);
    }

    #[test]
    fn test_lowering_fills_scratch() {
        let (_, costs) = triangle();
        let c = description(CostRepresentation::diagonal(costs), 1);
        let mut scratch = PhaseBuffer::new(3).unwrap();

        let mut names = Vec::new();
        c.for_each_gate(&mut scratch, |gate| {
            gate.validate(3)?;
            names.push(gate.name());
            Ok(())
        })
        .unwrap();

        assert_eq!(names, vec!["h", "h", "h", "diagonal", "rx", "rx", "rx"]);
        // c_0 = 0 → phase 1
        assert!((scratch.as_slice()[0].re - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_lowering_propagates_callback_error() {
        let (g, _) = triangle();
        let c = description(CostRepresentation::edge_local(&g, Normalization::Full), 1);
        let mut scratch = PhaseBuffer::unallocated();
        let err = c
            .for_each_gate(&mut scratch, |_| Err(QcutError::SimulatorFailure("stop".into())))
            .unwrap_err();
        assert_eq!(err, QcutError::SimulatorFailure("stop".into()));
    }

    #[test]
    fn test_validate_structure() {
        let mut c = CircuitDescription::new(2);
        assert!(c.validate().is_err());

        c.push(Layer::Mixer { beta: 0.1 });
        assert!(matches!(c.validate(), Err(QcutError::MalformedCircuit(_))));

        let (_, costs) = triangle();
        let mut c = CircuitDescription::new(2);
        c.push(Layer::InitAllSuperposition);
        c.push(Layer::Cost {
            gamma: 0.1,
            representation: CostRepresentation::diagonal(costs),
        });
        c.push(Layer::Mixer { beta: 0.1 });
        assert!(matches!(
            c.validate(),
            Err(QcutError::DiagonalLengthMismatch { expected: 4, actual: 8 })
        ));
    }

    #[test]
    fn test_to_qasm() {
        let g = Graph::unweighted(2, &[(0, 1)]).unwrap();
        let mut c = CircuitDescription::new(2);
        c.push(Layer::InitAllSuperposition);
        c.push(Layer::Cost {
            gamma: 0.5,
            representation: CostRepresentation::edge_local(&g, Normalization::Full),
        });
        c.push(Layer::Mixer { beta: 0.25 });

        let qasm = c.to_qasm().unwrap();
        assert!(qasm.starts_with("OPENQASM 2.0;"));
        assert!(qasm.contains("qreg q[2];"));
        assert!(qasm.contains("rzz(-0.5) q[0],q[1];"));
        assert!(qasm.contains("rx(0.5) q[1];"));

        let costs = Arc::new(CostVector::compute(&g, Normalization::Full).unwrap());
        let mut d = CircuitDescription::new(2);
        d.push(Layer::InitAllSuperposition);
        d.push(Layer::Cost {
            gamma: 0.5,
            representation: CostRepresentation::diagonal(costs),
        });
        assert!(matches!(d.to_qasm(), Err(QcutError::NotExpressible(_))));
    }
}
