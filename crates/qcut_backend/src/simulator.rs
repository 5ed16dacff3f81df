//! Dense state-vector simulator for QCUT
//!
//! Gantree: L2_Backend → DenseSimulator
//!
//! Exact simulator keeping a 2^n amplitude vector in the caller's thread.
//! State and probability buffers are allocated once and rewritten in place
//! on every run.

use crate::execution::{FinalizeMode, SimulationOutput, Simulator};
use crate::offload::OffloadSimulator;
use crate::statevector::{ProbBuffer, StateBuffer};
use qcut_core::{types::checked_bytes, Device, Gate, Precision, QcutError, QcutResult};

/// Dense local simulator
/// Gantree: DenseSimulator // 로컬 상태 벡터
#[derive(Debug)]
pub struct DenseSimulator {
    /// Simulator name
    name: String,

    /// Number of qubits
    num_qubits: usize,

    /// Memory limit in bytes (state + probabilities)
    memory_limit: Option<u128>,

    /// Amplitudes
    state: StateBuffer,

    /// Probability output, allocated on first use
    probs: Option<ProbBuffer>,

    /// Gates applied since last reset
    applied: usize,
}

impl DenseSimulator {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a simulator with a `|0…0⟩` state
    pub fn new(num_qubits: usize, precision: Precision) -> QcutResult<Self> {
        Self::with_memory_limit(num_qubits, precision, None)
    }

    /// Create, refusing registers whose buffers exceed `limit` bytes
    pub fn with_memory_limit(
        num_qubits: usize,
        precision: Precision,
        limit: Option<u128>,
    ) -> QcutResult<Self> {
        let state = StateBuffer::zeros(num_qubits, precision, limit)?;

        Ok(Self {
            name: format!("dense_{}", precision),
            num_qubits,
            memory_limit: limit,
            state,
            probs: None,
            applied: 0,
        })
    }

    /// Create ideal full-precision simulator
    pub fn ideal(num_qubits: usize) -> QcutResult<Self> {
        Self::new(num_qubits, Precision::Full)
    }

    /// Set simulator name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    /// Gates applied since last reset
    pub fn applied(&self) -> usize {
        self.applied
    }

    /// Current amplitudes
    pub fn state(&self) -> &StateBuffer {
        &self.state
    }

    fn ensure_probs(&mut self) -> QcutResult<()> {
        if self.probs.is_none() {
            let precision = self.state.precision();
            let total = precision.bytes_per_amplitude() + precision.bytes_per_real();
            checked_bytes(self.num_qubits, total, self.memory_limit)?;
            self.probs = Some(ProbBuffer::zeros_like(&self.state)?);
        }
        Ok(())
    }

    fn ensure_state(&mut self) -> QcutResult<()> {
        if self.state.is_empty() {
            self.state = StateBuffer::zeros(self.num_qubits, self.state.precision(), self.memory_limit)?;
        }
        Ok(())
    }
}

impl Simulator for DenseSimulator {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn precision(&self) -> Precision {
        self.state.precision()
    }

    fn reset(&mut self) -> QcutResult<()> {
        self.ensure_state()?;
        self.state.reset();
        self.applied = 0;
        Ok(())
    }

    fn apply(&mut self, gate: &Gate<'_>) -> QcutResult<()> {
        gate.validate(self.num_qubits)?;
        self.state.apply(gate);
        self.applied += 1;
        Ok(())
    }

    fn finalize(&mut self, mode: &FinalizeMode) -> QcutResult<SimulationOutput<'_>> {
        match mode {
            FinalizeMode::Statevector => Ok(SimulationOutput::Statevector(&self.state)),
            FinalizeMode::Probabilities => {
                self.ensure_probs()?;
                let probs = self
                    .probs
                    .as_mut()
                    .ok_or_else(|| QcutError::InternalError("probability buffer missing".into()))?;
                self.state.probabilities_into(probs)?;
                Ok(SimulationOutput::Probabilities(probs))
            }
            FinalizeMode::Expectation(observable) => {
                Ok(SimulationOutput::Expectation(observable.expectation(&self.state)?))
            }
        }
    }

    fn memory_bytes(&self) -> usize {
        self.state.bytes() + self.probs.as_ref().map_or(0, |p| p.bytes())
    }

    fn release(&mut self) {
        self.state.release();
        self.probs = None;
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Create the simulator serving `device`
/// Gantree: create_simulator(n, precision, device, limit) -> Box<dyn Simulator> // 팩토리
pub fn create_simulator(
    num_qubits: usize,
    precision: Precision,
    device: Device,
    memory_limit: Option<u128>,
) -> QcutResult<Box<dyn Simulator>> {
    let dense = DenseSimulator::with_memory_limit(num_qubits, precision, memory_limit)?;

    Ok(match device {
        Device::Local => Box::new(dense),
        Device::Accelerator => Box::new(OffloadSimulator::spawn(dense)?),
    })
}

// ============================================================================
// Tests
// ============================================================================
