//! Error types for QCUT
//!
//! Gantree: L0_Foundation → Errors
//!
//! One error enum shared by every QCUT crate.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QCUT
/// Gantree: QcutError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QcutError {
    // ========================================================================
    // Capacity Errors (fatal)
    // ========================================================================
    /// State space of 2^n entries cannot be addressed or allocated
    /// Gantree: CapacityExceeded{{qubits,bytes}} // 2^n 초과
    #[error("Capacity exceeded: 2^{qubits} entries need {bytes:?} bytes, which cannot be allocated")]
    CapacityExceeded { qubits: usize, bytes: Option<u128> },

    /// State space larger than the configured memory limit
    #[error("Capacity exceeded: {qubits} qubits need {required} bytes, limit is {limit} bytes")]
    MemoryLimitExceeded {
        qubits: usize,
        required: u128,
        limit: u128,
    },

    // ========================================================================
    // Graph Errors
    // ========================================================================
    /// Edge endpoint outside [0, n)
    /// Gantree: NodeOutOfRange{{node,n}} // 노드 범위
    #[error("Edge ({u}, {v}) references a node outside [0, {num_nodes})")]
    NodeOutOfRange { u: usize, v: usize, num_nodes: usize },

    /// Edge connecting a node to itself
    #[error("Self loop on node {0} is not allowed")]
    SelfLoop(usize),

    /// Non-finite edge weight
    #[error("Invalid weight {weight} on edge ({u}, {v}): must be finite")]
    InvalidWeight { u: usize, v: usize, weight: f64 },

    // ========================================================================
    // Circuit Errors
    // ========================================================================
    /// Parameter vector length differs from 2·L
    /// Gantree: ParameterLengthMismatch{{expected,actual}} // 2L
    #[error("Parameter vector has {actual} entries, expected {expected} (2 x layers)")]
    ParameterLengthMismatch { expected: usize, actual: usize },

    /// Diagonal gate does not cover the full register
    #[error("Diagonal of length {actual} does not match state dimension {expected}")]
    DiagonalLengthMismatch { expected: usize, actual: usize },

    /// Gate on non-existent qubit
    #[error("Gate references qubit {qubit} but circuit has only {num_qubits} qubits")]
    GateQubitMismatch { qubit: usize, num_qubits: usize },

    /// Layer sequence is not Init followed by (Cost, Mixer) pairs
    #[error("Malformed circuit: {0}")]
    MalformedCircuit(String),

    /// Circuit has no OpenQASM 2.0 rendering
    #[error("Circuit cannot be exported: {0}")]
    NotExpressible(String),

    // ========================================================================
    // Simulator Errors
    // ========================================================================
    /// Simulator invocation failed
    /// Gantree: SimulatorFailure(String) // 시뮬레이터
    #[error("Simulator failure: {0}")]
    SimulatorFailure(String),

    /// Backend not available
    #[error("Backend '{0}' not available")]
    BackendUnavailable(String),

    /// Simulator samples shots instead of computing exact values
    #[error("Simulator '{0}' is not exact; sampled evaluation is not supported")]
    NonExactSimulator(String),

    /// Observable dimension mismatch
    #[error("Observable covers {actual} qubits but the state has {expected}")]
    ObservableMismatch { expected: usize, actual: usize },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Result type alias for QCUT operations
/// Gantree: QcutResult<T> // type alias
pub type QcutResult<T> = Result<T, QcutError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QcutError {
    fn from(err: serde_json::Error) -> Self {
        QcutError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for QcutError {
    fn from(err: std::io::Error) -> Self {
        QcutError::FileError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QcutError {
    /// Fatal errors abort the whole optimization run
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            QcutError::CapacityExceeded { .. }
                | QcutError::MemoryLimitExceeded { .. }
                | QcutError::SimulatorFailure(_)
                | QcutError::BackendUnavailable(_)
                | QcutError::InternalError(_)
        )
    }

    /// Check if error is a capacity error
    pub fn is_capacity_error(&self) -> bool {
        matches!(
            self,
            QcutError::CapacityExceeded { .. } | QcutError::MemoryLimitExceeded { .. }
        )
    }

    /// Check if error is a validation error (rejected before simulation)
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            QcutError::NodeOutOfRange { .. }
                | QcutError::SelfLoop(_)
                | QcutError::InvalidWeight { .. }
                | QcutError::ParameterLengthMismatch { .. }
                | QcutError::DiagonalLengthMismatch { .. }
                | QcutError::GateQubitMismatch { .. }
                | QcutError::MalformedCircuit(_)
                | QcutError::ConfigError(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
