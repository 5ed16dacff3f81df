//! Core types for QCUT
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Type aliases, precision/device selectors and state-space sizing used
//! throughout the QCUT system.

use crate::error::{QcutError, QcutResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Qubit identifier (0-indexed, one qubit per graph node)
/// Gantree: QubitId // pub type QubitId = usize
pub type QubitId = usize;

/// Graph node identifier
pub type NodeId = usize;

/// Rotation angle in radians
/// Gantree: Angle // pub type Angle = f64
pub type Angle = f64;

/// Flat parameter vector `[γ_0..γ_{L-1}, β_0..β_{L-1}]`
/// Gantree: ParamVec // pub type ParamVec = Vec<f64>
pub type ParamVec = Vec<f64>;

// ============================================================================
// Precision
// ============================================================================

/// Floating precision of simulated amplitudes
/// Gantree: Precision // reduced/full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Precision {
    /// Single precision (f32 amplitudes, half the memory)
    Reduced,
    /// Double precision (f64 amplitudes)
    #[default]
    Full,
}

impl Precision {
    /// Bytes per complex amplitude
    pub fn bytes_per_amplitude(&self) -> usize {
        match self {
            Precision::Reduced => 8,
            Precision::Full => 16,
        }
    }

    /// Bytes per real probability
    pub fn bytes_per_real(&self) -> usize {
        self.bytes_per_amplitude() / 2
    }

    /// Parse from string ("single"/"reduced"/"f32", "double"/"full"/"f64")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "single" | "reduced" | "f32" => Some(Precision::Reduced),
            "double" | "full" | "f64" => Some(Precision::Full),
            _ => None,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Reduced => write!(f, "single"),
            Precision::Full => write!(f, "double"),
        }
    }
}

// ============================================================================
// Device
// ============================================================================

/// Where simulator state lives
/// Gantree: Device // local/accelerator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Device {
    /// State kept in the caller's thread
    #[default]
    Local,
    /// State resident on a dedicated execution worker
    Accelerator,
}

impl Device {
    /// Parse from string ("cpu"/"local", "gpu"/"accelerator")
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cpu" | "local" => Some(Device::Local),
            "gpu" | "accelerator" => Some(Device::Accelerator),
            _ => None,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Local => write!(f, "local"),
            Device::Accelerator => write!(f, "accelerator"),
        }
    }
}

// ============================================================================
// State-Space Sizing
// ============================================================================

/// Number of basis states (2^n), or `CapacityExceeded` if not addressable
/// Gantree: dimension(n) -> Result<usize> // 2^n
pub fn dimension(num_qubits: usize) -> QcutResult<usize> {
    if num_qubits >= usize::BITS as usize {
        return Err(QcutError::CapacityExceeded {
            qubits: num_qubits,
            bytes: None,
        });
    }
    Ok(1usize << num_qubits)
}

/// Bytes needed for 2^n elements of `elem_bytes` each, checked against an
/// optional limit
pub fn checked_bytes(num_qubits: usize, elem_bytes: usize, limit: Option<u128>) -> QcutResult<u128> {
    let dim = dimension(num_qubits)? as u128;
    let required = dim * elem_bytes as u128;

    if required > isize::MAX as u128 {
        return Err(QcutError::CapacityExceeded {
            qubits: num_qubits,
            bytes: Some(required),
        });
    }

    if let Some(limit) = limit {
        if required > limit {
            return Err(QcutError::MemoryLimitExceeded {
                qubits: num_qubits,
                required,
                limit,
            });
        }
    }

    Ok(required)
}

/// Allocate a zero-filled buffer of 2^n elements without aborting on failure
pub fn try_alloc<T: Clone>(num_qubits: usize, fill: T) -> QcutResult<Vec<T>> {
    let dim = dimension(num_qubits)?;
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(dim)
        .map_err(|_| QcutError::CapacityExceeded {
            qubits: num_qubits,
            bytes: Some(dim as u128 * std::mem::size_of::<T>() as u128),
        })?;
    buffer.resize(dim, fill);
    Ok(buffer)
}

/// Bit `i` of assignment `k` (partition of node `i`)
#[inline]
pub fn bit(k: usize, i: usize) -> bool {
    (k >> i) & 1 == 1
}

/// Render assignment `k` as a bitstring, node 0 rightmost
pub fn assignment_bitstring(k: usize, num_nodes: usize) -> String {
    format!("{:0width$b}", k, width = num_nodes)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension() {
        assert_eq!(dimension(0).unwrap(), 1);
        assert_eq!(dimension(4).unwrap(), 16);
        assert!(dimension(usize::BITS as usize).unwrap_err().is_capacity_error());
    }

    #[test]
    fn test_checked_bytes_limit() {
        assert_eq!(checked_bytes(10, 16, None).unwrap(), 16 * 1024);
        let err = checked_bytes(10, 16, Some(1024)).unwrap_err();
        assert!(matches!(err, QcutError::MemoryLimitExceeded { .. }));
        assert!(checked_bytes(62, 16, None).unwrap_err().is_capacity_error());
    }

    #[test]
    fn test_try_alloc() {
        let buf = try_alloc(3, 0.0f64).unwrap();
        assert_eq!(buf.len(), 8);
        assert!(buf.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_precision() {
        assert_eq!(Precision::parse("single"), Some(Precision::Reduced));
        assert_eq!(Precision::parse("F64"), Some(Precision::Full));
        assert_eq!(Precision::Reduced.bytes_per_amplitude(), 8);
        assert_eq!(Precision::Full.bytes_per_real(), 8);
    }

    #[test]
    fn test_device() {
        assert_eq!(Device::parse("GPU"), Some(Device::Accelerator));
        assert_eq!(Device::parse("cpu"), Some(Device::Local));
        assert_eq!(Device::parse("tpu"), None);
    }

    #[test]
    fn test_bits() {
        assert!(bit(0b0101, 0));
        assert!(!bit(0b0101, 1));
        assert_eq!(assignment_bitstring(5, 4), "0101");
    }
}
