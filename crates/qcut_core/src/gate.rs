//! Lowered gate definitions for QCUT
//!
//! Gantree: L1_Circuit → Gate
//!
//! The small gate set a simulator executes. `Diagonal` borrows its phases
//! from the run's [`PhaseBuffer`](crate::phase::PhaseBuffer), so lowering a
//! diagonal cost layer never copies 2^n data.

use crate::error::{QcutError, QcutResult};
use crate::types::{dimension, Angle, QubitId};
use num_complex::Complex64;
use std::fmt;

/// Executable gate
/// Gantree: Gate<'a> // 게이트 enum
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate<'a> {
    /// Hadamard gate
    /// Gantree: H(QubitId) // 하다마드
    H(QubitId),

    /// Rotation around X-axis, `exp(-iθX/2)`
    /// Gantree: Rx(QubitId, Angle) // X 회전
    Rx(QubitId, Angle),

    /// Parity rotation `exp(-iθ Z⊗Z/2)`
    /// Gantree: Rzz(QubitId, QubitId, Angle) // ZZ 회전
    Rzz(QubitId, QubitId, Angle),

    /// Full-register diagonal, amplitude `k` multiplied by entry `k`
    /// Gantree: Diagonal(&[C64]) // 대각 위상
    Diagonal(&'a [Complex64]),
}

impl<'a> Gate<'a> {
    // ========================================================================
    // Gate Properties
    // ========================================================================

    /// Qubits touched by this gate (empty for full-register diagonals)
    /// Gantree: qubits(&self) -> Vec<QubitId> // 관련 큐비트
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Gate::H(q) | Gate::Rx(q, _) => vec![*q],
            Gate::Rzz(u, v, _) => vec![*u, *v],
            Gate::Diagonal(_) => vec![],
        }
    }

    /// Check if gate is single-qubit
    pub fn is_single_qubit(&self) -> bool {
        matches!(self, Gate::H(_) | Gate::Rx(_, _))
    }

    /// Check if gate is two-qubit
    pub fn is_two_qubit(&self) -> bool {
        matches!(self, Gate::Rzz(_, _, _))
    }

    /// Check if gate is diagonal in the computational basis
    pub fn is_diagonal(&self) -> bool {
        matches!(self, Gate::Rzz(_, _, _) | Gate::Diagonal(_))
    }

    /// Check if gate is parameterized
    pub fn is_parameterized(&self) -> bool {
        !matches!(self, Gate::H(_))
    }

    /// Get gate name
    pub fn name(&self) -> &'static str {
        match self {
            Gate::H(_) => "h",
            Gate::Rx(_, _) => "rx",
            Gate::Rzz(_, _, _) => "rzz",
            Gate::Diagonal(_) => "diagonal",
        }
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check the gate fits a register of `num_qubits` qubits
    /// Gantree: validate(&self, n) -> Result // 범위 검증
    pub fn validate(&self, num_qubits: usize) -> QcutResult<()> {
        for qubit in self.qubits() {
            if qubit >= num_qubits {
                return Err(QcutError::GateQubitMismatch { qubit, num_qubits });
            }
        }

        match self {
            Gate::Rzz(u, v, _) if u == v => Err(QcutError::MalformedCircuit(format!(
                "rzz acts twice on qubit {}",
                u
            ))),
            Gate::Diagonal(phases) => {
                let expected = dimension(num_qubits)?;
                if phases.len() != expected {
                    return Err(QcutError::DiagonalLengthMismatch {
                        expected,
                        actual: phases.len(),
                    });
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    // ========================================================================
    // QASM Conversion
    // ========================================================================

    /// Convert to OpenQASM 2.0 string
    /// Gantree: to_qasm(&self) -> Result<String> // QASM 변환
    pub fn to_qasm(&self) -> QcutResult<String> {
        match self {
            Gate::H(q) => Ok(format!("h q[{}];", q)),
            Gate::Rx(q, theta) => Ok(format!("rx({}) q[{}];", theta, q)),
            Gate::Rzz(u, v, theta) => Ok(format!("rzz({}) q[{}],q[{}];", theta, u, v)),
            Gate::Diagonal(_) => Err(QcutError::NotExpressible(
                "full-register diagonal has no OpenQASM 2.0 form".into(),
            )),
        }
    }
}

impl fmt::Display for Gate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::Diagonal(phases) => write!(f, "diagonal[{}]", phases.len()),
            gate => match gate.to_qasm() {
                Ok(qasm) => write!(f, "{}", qasm),
                Err(_) => write!(f, "{}", gate.name()),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_qubits() {
        assert_eq!(Gate::H(0).qubits(), vec![0]);
        assert_eq!(Gate::Rzz(0, 3, 0.1).qubits(), vec![0, 3]);
        assert!(Gate::Diagonal(&[]).qubits().is_empty());
    }

    #[test]
    fn test_gate_classification() {
        assert!(Gate::Rx(0, 1.0).is_single_qubit());
        assert!(Gate::Rx(0, 1.0).is_parameterized());
        assert!(!Gate::H(0).is_parameterized());
        assert!(Gate::Rzz(0, 1, 0.5).is_two_qubit());
        assert!(Gate::Rzz(0, 1, 0.5).is_diagonal());
        assert!(!Gate::Rx(0, 0.5).is_diagonal());
    }

    #[test]
    fn test_gate_validate() {
        assert!(Gate::H(2).validate(3).is_ok());
        assert_eq!(
            Gate::Rx(3, 0.0).validate(3).unwrap_err(),
            QcutError::GateQubitMismatch {
                qubit: 3,
                num_qubits: 3
            }
        );
        assert!(Gate::Rzz(1, 1, 0.0).validate(3).is_err());

        let phases = vec![Complex64::new(1.0, 0.0); 4];
        assert!(Gate::Diagonal(&phases).validate(2).is_ok());
        assert!(matches!(
            Gate::Diagonal(&phases).validate(3),
            Err(QcutError::DiagonalLengthMismatch { expected: 8, actual: 4 })
        ));
    }

    #[test]
    fn test_gate_to_qasm() {
        assert_eq!(Gate::H(0).to_qasm().unwrap(), "h q[0];");
        assert_eq!(Gate::Rx(1, 0.5).to_qasm().unwrap(), "rx(0.5) q[1];");
        assert_eq!(
            Gate::Rzz(0, 2, -0.25).to_qasm().unwrap(),
            "rzz(-0.25) q[0],q[2];"
        );
        assert!(matches!(
            Gate::Diagonal(&[]).to_qasm(),
            Err(QcutError::NotExpressible(_))
        ));
    }

    #[test]
    fn test_gate_display() {
        let phases = vec![Complex64::new(1.0, 0.0); 8];
        assert_eq!(Gate::Diagonal(&phases).to_string(), "diagonal[8]");
        assert_eq!(Gate::H(1).to_string(), "h q[1];");
    }
}
