//! Cost model for QCUT
//!
//! Gantree: L1_Problem → CostModel
//!
//! Per-assignment Max-Cut values. Entry `k` of a [`CostVector`] is the
//! (normalized) weighted number of edges cut when node `i` sits on side
//! `bit(k, i)`. Computed once per graph and shared read-only afterwards.

use crate::error::{QcutError, QcutResult};
use crate::graph::Graph;
use crate::types::{checked_bytes, try_alloc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Normalization
// ============================================================================

/// Scale applied to each cut edge's weight
/// Gantree: Normalization // full/half
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Normalization {
    /// Raw weighted crossing count
    #[default]
    Full,
    /// Half the crossing count
    Half,
}

impl Normalization {
    /// Multiplier per unit of cut weight
    pub fn scale(&self) -> f64 {
        match self {
            Normalization::Full => 1.0,
            Normalization::Half => 0.5,
        }
    }

    /// Parse from string ("full"/"count", "half")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "full" | "count" => Some(Normalization::Full),
            "half" => Some(Normalization::Half),
            _ => None,
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Normalization::Full => write!(f, "full"),
            Normalization::Half => write!(f, "half"),
        }
    }
}

/// Cut value of a single assignment by direct summation over edges
/// Gantree: cut_value(graph, norm, k) -> f64 // 단일 할당
pub fn cut_value(graph: &Graph, normalization: Normalization, assignment: usize) -> f64 {
    graph.cut_weight(assignment) * normalization.scale()
}

// ============================================================================
// Cost Vector
// ============================================================================

/// Dense table of cut values over all 2^n assignments
/// Gantree: CostVector // 2^n 비용
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostVector {
    num_qubits: usize,
    normalization: Normalization,
    values: Vec<f64>,
}

impl CostVector {
    /// Compute the cost table for `graph`
    /// Gantree: compute(graph, norm) -> Result<Self> // O(2^n·|E|)
    pub fn compute(graph: &Graph, normalization: Normalization) -> QcutResult<Self> {
        Self::compute_with_limit(graph, normalization, None)
    }

    /// Compute, refusing tables larger than `limit` bytes
    pub fn compute_with_limit(
        graph: &Graph,
        normalization: Normalization,
        limit: Option<u128>,
    ) -> QcutResult<Self> {
        let n = graph.num_nodes();
        checked_bytes(n, std::mem::size_of::<f64>(), limit)?;

        let mut values = try_alloc(n, 0.0f64)?;
        let scale = normalization.scale();

        for (k, value) in values.iter_mut().enumerate() {
            let mut cut = 0.0;
            for edge in graph.edges() {
                if edge.is_cut(k) {
                    cut += edge.weight;
                }
            }
            *value = cut * scale;
        }

        Ok(Self {
            num_qubits: n,
            normalization,
            values,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of qubits (graph nodes)
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of entries (2^n)
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; a 0-node graph still has one assignment
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Normalization the table was computed with
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }

    /// Raw values
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Value of assignment `k`
    pub fn get(&self, k: usize) -> Option<f64> {
        self.values.get(k).copied()
    }

    /// Heap bytes held by the table
    pub fn bytes(&self) -> usize {
        self.values.len() * std::mem::size_of::<f64>()
    }

    // ========================================================================
    // Reductions
    // ========================================================================

    /// Best assignment and its value (lowest index on ties)
    /// Gantree: max_cut() -> (usize, f64) // argmax
    pub fn max_cut(&self) -> (usize, f64) {
        let mut best = (0, f64::NEG_INFINITY);
        for (k, &v) in self.values.iter().enumerate() {
            if v > best.1 {
                best = (k, v);
            }
        }
        best
    }

    /// Mean value over all assignments (uniform distribution)
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Σ p_k · c_k for a probability vector of matching length
    /// Gantree: expectation(p) -> Result<f64> // 기댓값
    pub fn expectation<T>(&self, probabilities: &[T]) -> QcutResult<f64>
    where
        T: Copy + Into<f64>,
    {
        if probabilities.len() != self.values.len() {
            return Err(QcutError::DiagonalLengthMismatch {
                expected: self.values.len(),
                actual: probabilities.len(),
            });
        }

        Ok(probabilities
            .iter()
            .zip(&self.values)
            .map(|(&p, &c)| p.into() * c)
            .sum())
    }
}

impl std::ops::Index<usize> for CostVector {
    type Output = f64;

    fn index(&self, k: usize) -> &f64 {
        &self.values[k]
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_single_edge() {
        let g = Graph::unweighted(2, &[(0, 1)]).unwrap();
        let costs = CostVector::compute(&g, Normalization::Full).unwrap();
        assert_eq!(costs.as_slice(), &[0.0, 1.0, 1.0, 0.0]);

        let half = CostVector::compute(&g, Normalization::Half).unwrap();
        assert_eq!(half.as_slice(), &[0.0, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_matches_direct_summation() {
        let g = Graph::weighted(4, &[(0, 1, 1.0), (1, 2, 2.5), (2, 3, 0.5), (0, 3, 1.0), (0, 2, 3.0)])
            .unwrap();

        for norm in [Normalization::Full, Normalization::Half] {
            let costs = CostVector::compute(&g, norm).unwrap();
            assert_eq!(costs.len(), 16);
            for k in 0..16 {
                assert_relative_eq!(costs[k], cut_value(&g, norm, k), epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_single_node() {
        let costs = CostVector::compute(&Graph::empty(1), Normalization::Full).unwrap();
        assert_eq!(costs.as_slice(), &[0.0, 0.0]);
        assert_eq!(costs.max_cut(), (0, 0.0));
    }

    #[test]
    fn test_four_cycle_reductions() {
        let costs = CostVector::compute(&Graph::cycle(4), Normalization::Full).unwrap();
        assert_eq!(costs.max_cut(), (0b0101, 4.0));
        assert_relative_eq!(costs.mean(), 2.0, epsilon = 1e-12);

        let uniform = vec![1.0 / 16.0; 16];
        assert_relative_eq!(costs.expectation(&uniform).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_expectation_length_mismatch() {
        let costs = CostVector::compute(&Graph::cycle(3), Normalization::Full).unwrap();
        let err = costs.expectation(&[0.5f32, 0.5]).unwrap_err();
        assert_eq!(
            err,
            QcutError::DiagonalLengthMismatch {
                expected: 8,
                actual: 2
            }
        );
    }

    #[test]
    fn test_memory_limit() {
        let err = CostVector::compute_with_limit(&Graph::path(20), Normalization::Full, Some(1024))
            .unwrap_err();
        assert!(err.is_capacity_error());
    }

    #[test]
    fn test_capacity_exceeded() {
        let err = CostVector::compute(&Graph::empty(70), Normalization::Full).unwrap_err();
        assert!(err.is_capacity_error());
    }
}
