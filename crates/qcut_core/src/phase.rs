//! Diagonal phase scratch buffer for QCUT
//!
//! Gantree: L1_Circuit → PhaseBuffer
//!
//! Holds `exp(-iγ·c_k)` for the current cost layer. Allocated once per run
//! and overwritten in place by every diagonal cost layer.

use crate::cost::CostVector;
use crate::error::{QcutError, QcutResult};
use crate::types::try_alloc;
use num_complex::Complex64;

/// Reusable 2^n complex phase buffer
/// Gantree: PhaseBuffer // 위상 스크래치
#[derive(Debug, Clone)]
pub struct PhaseBuffer {
    num_qubits: usize,
    phases: Vec<Complex64>,
}

impl PhaseBuffer {
    /// Allocate a buffer for `num_qubits` qubits
    pub fn new(num_qubits: usize) -> QcutResult<Self> {
        Ok(Self {
            num_qubits,
            phases: try_alloc(num_qubits, Complex64::new(1.0, 0.0))?,
        })
    }

    /// Buffer with no storage, for circuits without diagonal layers
    pub fn unallocated() -> Self {
        Self {
            num_qubits: 0,
            phases: Vec::new(),
        }
    }

    /// Write `exp(-iγ·c_k)` for every `k` and return the filled slice
    /// Gantree: fill(costs, γ) -> Result<&[C64]> // 제자리 갱신
    pub fn fill(&mut self, costs: &CostVector, gamma: f64) -> QcutResult<&[Complex64]> {
        if costs.len() != self.phases.len() {
            return Err(QcutError::DiagonalLengthMismatch {
                expected: self.phases.len(),
                actual: costs.len(),
            });
        }

        for (phase, &c) in self.phases.iter_mut().zip(costs.as_slice()) {
            *phase = Complex64::from_polar(1.0, -gamma * c);
        }

        Ok(&self.phases)
    }

    /// Current contents
    pub fn as_slice(&self) -> &[Complex64] {
        &self.phases
    }

    /// Number of qubits the buffer covers
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    /// Whether storage is allocated
    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Heap bytes held
    pub fn bytes(&self) -> usize {
        self.phases.len() * std::mem::size_of::<Complex64>()
    }

    /// Drop the storage
    pub fn release(&mut self) {
        self.phases = Vec::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Normalization;
    use crate::graph::Graph;
    use approx::assert_relative_eq;

    #[test]
    fn test_fill_in_place() {
        let g = Graph::unweighted(2, &[(0, 1)]).unwrap();
        let costs = CostVector::compute(&g, Normalization::Full).unwrap();
        let mut buf = PhaseBuffer::new(2).unwrap();
        let ptr = buf.as_slice().as_ptr();

        let gamma = std::f64::consts::FRAC_PI_2;
        let phases = buf.fill(&costs, gamma).unwrap();
        assert_relative_eq!(phases[0].re, 1.0, epsilon = 1e-12);
        assert_relative_eq!(phases[1].re, 0.0, epsilon = 1e-12);
        assert_relative_eq!(phases[1].im, -1.0, epsilon = 1e-12);
        assert_eq!(phases.as_ptr(), ptr);

        buf.fill(&costs, 0.0).unwrap();
        assert!(buf.as_slice().iter().all(|p| (p.re - 1.0).abs() < 1e-12));
        assert_eq!(buf.as_slice().as_ptr(), ptr);
    }

    #[test]
    fn test_length_mismatch() {
        let costs = CostVector::compute(&Graph::cycle(3), Normalization::Full).unwrap();
        let mut buf = PhaseBuffer::new(2).unwrap();
        assert!(matches!(
            buf.fill(&costs, 0.1),
            Err(QcutError::DiagonalLengthMismatch { expected: 4, actual: 8 })
        ));
    }

    #[test]
    fn test_release() {
        let mut buf = PhaseBuffer::new(4).unwrap();
        assert_eq!(buf.bytes(), 16 * 16);
        buf.release();
        assert!(buf.is_empty());
        assert_eq!(buf.bytes(), 0);
    }
}
