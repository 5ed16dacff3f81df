//! Problem graph for QCUT
//!
//! Gantree: L1_Problem → Graph
//!
//! Undirected, optionally weighted graph on nodes `0..n`. Validated at
//! construction and immutable afterwards.

use crate::error::{QcutError, QcutResult};
use crate::types::{bit, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Undirected weighted edge
/// Gantree: Edge // (u, v, w)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// First endpoint
    pub u: NodeId,
    /// Second endpoint
    pub v: NodeId,
    /// Edge weight (1.0 when unweighted)
    pub weight: f64,
}

impl Edge {
    /// Unit-weight edge
    pub fn new(u: NodeId, v: NodeId) -> Self {
        Self { u, v, weight: 1.0 }
    }

    /// Weighted edge
    pub fn weighted(u: NodeId, v: NodeId, weight: f64) -> Self {
        Self { u, v, weight }
    }

    /// Whether assignment `k` places the endpoints in different partitions
    #[inline]
    pub fn is_cut(&self, k: usize) -> bool {
        bit(k, self.u) != bit(k, self.v)
    }
}

/// Max-Cut problem graph
/// Gantree: Graph // 문제 그래프
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    /// Number of nodes
    /// Gantree: num_nodes: usize // 노드 수
    num_nodes: usize,

    /// Edge list
    /// Gantree: edges: Vec<Edge> // 간선 목록
    edges: Vec<Edge>,

    /// Optional graph name
    name: Option<String>,
}

impl Graph {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create from weighted edges, rejecting malformed input
    /// Gantree: new(n, edges) -> Result<Self> // 생성+검증
    pub fn new(num_nodes: usize, edges: Vec<Edge>) -> QcutResult<Self> {
        for edge in &edges {
            if edge.u >= num_nodes || edge.v >= num_nodes {
                return Err(QcutError::NodeOutOfRange {
                    u: edge.u,
                    v: edge.v,
                    num_nodes,
                });
            }
            if edge.u == edge.v {
                return Err(QcutError::SelfLoop(edge.u));
            }
            if !edge.weight.is_finite() {
                return Err(QcutError::InvalidWeight {
                    u: edge.u,
                    v: edge.v,
                    weight: edge.weight,
                });
            }
        }

        Ok(Self {
            num_nodes,
            edges,
            name: None,
        })
    }

    /// Create from unit-weight `(u, v)` pairs
    pub fn unweighted(num_nodes: usize, pairs: &[(NodeId, NodeId)]) -> QcutResult<Self> {
        Self::new(num_nodes, pairs.iter().map(|&(u, v)| Edge::new(u, v)).collect())
    }

    /// Create from `(u, v, w)` triples
    pub fn weighted(num_nodes: usize, triples: &[(NodeId, NodeId, f64)]) -> QcutResult<Self> {
        Self::new(
            num_nodes,
            triples
                .iter()
                .map(|&(u, v, w)| Edge::weighted(u, v, w))
                .collect(),
        )
    }

    /// Graph with no edges
    pub fn empty(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            edges: Vec::new(),
            name: Some(format!("empty_{}", num_nodes)),
        }
    }

    /// Cycle 0-1-...-(n-1)-0
    /// Gantree: cycle(n) -> Self // 원형
    pub fn cycle(n: usize) -> Self {
        let mut edges: Vec<Edge> = (0..n.saturating_sub(1)).map(|i| Edge::new(i, i + 1)).collect();

        if n > 2 {
            edges.push(Edge::new(n - 1, 0));
        }

        Self {
            num_nodes: n,
            edges,
            name: Some(format!("cycle_{}", n)),
        }
    }

    /// Path 0-1-...-(n-1)
    pub fn path(n: usize) -> Self {
        Self {
            num_nodes: n,
            edges: (0..n.saturating_sub(1)).map(|i| Edge::new(i, i + 1)).collect(),
            name: Some(format!("path_{}", n)),
        }
    }

    /// Complete graph K_n
    pub fn complete(n: usize) -> Self {
        let mut edges = Vec::new();

        for i in 0..n {
            for j in i + 1..n {
                edges.push(Edge::new(i, j));
            }
        }

        Self {
            num_nodes: n,
            edges,
            name: Some(format!("complete_{}", n)),
        }
    }

    /// Set graph name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    // ========================================================================
    // Properties
    // ========================================================================

    /// Number of nodes (= qubits)
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of edges
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Edge list
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Graph name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether any edge has a non-unit weight
    pub fn is_weighted(&self) -> bool {
        self.edges.iter().any(|e| e.weight != 1.0)
    }

    /// Sum of all edge weights
    pub fn total_weight(&self) -> f64 {
        self.edges.iter().map(|e| e.weight).sum()
    }

    /// Number of edges incident to `node`
    pub fn degree(&self, node: NodeId) -> usize {
        self.edges
            .iter()
            .filter(|e| e.u == node || e.v == node)
            .count()
    }

    /// Neighbors of `node`
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter_map(|e| {
                if e.u == node {
                    Some(e.v)
                } else if e.v == node {
                    Some(e.u)
                } else {
                    None
                }
            })
            .collect()
    }

    // ========================================================================
    // Cut Evaluation
    // ========================================================================

    /// Weighted number of edges cut by assignment `k` (bit i = side of node i)
    /// Gantree: cut_weight(k) -> f64 // 직접 합산
    pub fn cut_weight(&self, k: usize) -> f64 {
        self.edges
            .iter()
            .filter(|e| e.is_cut(k))
            .map(|e| e.weight)
            .sum()
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Graph({}, nodes={}, edges={})",
            self.name.as_deref().unwrap_or("unnamed"),
            self.num_nodes,
            self.edges.len()
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
