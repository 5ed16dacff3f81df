//! Offload simulator for QCUT
//!
//! Gantree: L2_Backend → OffloadSimulator
//!
//! Serves `Device::Accelerator`. The amplitude vector lives on a dedicated
//! worker thread; the host submits gates over a channel and `finalize`
//! blocks until the worker answers. A single diagonal staging buffer and
//! the output buffers travel back and forth and are reused, so steady-state
//! runs do not allocate.

use crate::execution::{FinalizeMode, SimulationOutput, Simulator};
use crate::simulator::DenseSimulator;
use crate::statevector::{ProbBuffer, StateBuffer};
use log::{debug, warn};
use num_complex::Complex64;
use qcut_core::{Device, Gate, Precision, QcutError, QcutResult};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

// ============================================================================
// Wire Types
// ============================================================================

/// Gate with owned diagonal payload
enum SubmittedGate {
    H(usize),
    Rx(usize, f64),
    Rzz(usize, usize, f64),
    Diagonal(Vec<Complex64>),
}

impl SubmittedGate {
    fn as_gate(&self) -> Gate<'_> {
        match self {
            SubmittedGate::H(q) => Gate::H(*q),
            SubmittedGate::Rx(q, theta) => Gate::Rx(*q, *theta),
            SubmittedGate::Rzz(u, v, theta) => Gate::Rzz(*u, *v, *theta),
            SubmittedGate::Diagonal(phases) => Gate::Diagonal(phases),
        }
    }
}

enum Command {
    Reset,
    Apply(SubmittedGate),
    Finalize {
        mode: FinalizeMode,
        state: Option<StateBuffer>,
        probs: Option<ProbBuffer>,
    },
    Release,
    Shutdown,
}

enum Readout {
    Statevector,
    Probabilities,
    Expectation(f64),
}

struct Reply {
    result: QcutResult<Readout>,
    state: Option<StateBuffer>,
    probs: Option<ProbBuffer>,
    resident_bytes: usize,
}

// ============================================================================
// Worker
// ============================================================================

fn worker_loop(
    mut sim: DenseSimulator,
    commands: Receiver<Command>,
    replies: Sender<Reply>,
    recycled: Sender<Vec<Complex64>>,
) {
    // First failure since the last reset, reported at finalize
    let mut failure: Option<QcutError> = None;

    while let Ok(command) = commands.recv() {
        match command {
            Command::Reset => failure = sim.reset().err(),
            Command::Apply(gate) => {
                if failure.is_none() {
                    failure = sim.apply(&gate.as_gate()).err();
                }
                if let SubmittedGate::Diagonal(buffer) = gate {
                    let _ = recycled.send(buffer);
                }
            }
            Command::Finalize { mode, state, probs } => {
                let reply = match failure.take() {
                    Some(err) => Reply {
                        result: Err(err),
                        state,
                        probs,
                        resident_bytes: sim.memory_bytes(),
                    },
                    None => finalize_into(&mut sim, &mode, state, probs),
                };
                if replies.send(reply).is_err() {
                    break;
                }
            }
            Command::Release => sim.release(),
            Command::Shutdown => break,
        }
    }
}

fn finalize_into(
    sim: &mut DenseSimulator,
    mode: &FinalizeMode,
    mut state: Option<StateBuffer>,
    mut probs: Option<ProbBuffer>,
) -> Reply {
    let result = match sim.finalize(mode) {
        Ok(SimulationOutput::Statevector(src)) => {
            match state.as_mut() {
                Some(dst) => dst.copy_from(src),
                None => state = Some(src.clone()),
            }
            Ok(Readout::Statevector)
        }
        Ok(SimulationOutput::Probabilities(src)) => {
            match probs.as_mut() {
                Some(dst) => dst.copy_from(src),
                None => probs = Some(src.clone()),
            }
            Ok(Readout::Probabilities)
        }
        Ok(SimulationOutput::Expectation(value)) => Ok(Readout::Expectation(value)),
        Err(err) => Err(err),
    };

    Reply {
        result,
        state,
        probs,
        resident_bytes: sim.memory_bytes(),
    }
}

// ============================================================================
// Host Handle
// ============================================================================

/// Worker-resident simulator behind a submit/block handle
/// Gantree: OffloadSimulator // 오프로드 핸들
pub struct OffloadSimulator {
    name: String,
    num_qubits: usize,
    precision: Precision,

    commands: Sender<Command>,
    replies: Receiver<Reply>,
    recycled: Receiver<Vec<Complex64>>,
    worker: Option<JoinHandle<()>>,

    /// Diagonal staging buffer, when the host holds it
    staging: Option<Vec<Complex64>>,

    /// The staging buffer is with the worker
    in_flight: bool,

    /// Capacity of the one staging buffer in bytes
    staging_bytes: usize,

    /// Host copies of the last readouts
    state: Option<StateBuffer>,
    probs: Option<ProbBuffer>,

    /// Bytes resident on the worker
    resident_bytes: usize,

    /// Gates submitted since last reset
    submitted: usize,
}

impl OffloadSimulator {
    /// Move `sim` onto a new worker thread
    /// Gantree: spawn(sim) -> Result<Self> // 워커 생성
    pub fn spawn(sim: DenseSimulator) -> QcutResult<Self> {
        let name = format!("offload_{}", sim.precision());
        let num_qubits = sim.num_qubits();
        let precision = sim.precision();
        let resident_bytes = sim.memory_bytes();

        let (command_tx, command_rx) = mpsc::channel();
        let (reply_tx, reply_rx) = mpsc::channel();
        let (recycle_tx, recycle_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name(format!("qcut-offload-{}q", num_qubits))
            .spawn(move || worker_loop(sim, command_rx, reply_tx, recycle_tx))
            .map_err(|e| QcutError::BackendUnavailable(format!("offload worker: {}", e)))?;

        debug!("offload worker started for {} qubits ({})", num_qubits, precision);

        Ok(Self {
            name,
            num_qubits,
            precision,
            commands: command_tx,
            replies: reply_rx,
            recycled: recycle_rx,
            worker: Some(worker),
            staging: None,
            in_flight: false,
            staging_bytes: 0,
            state: None,
            probs: None,
            resident_bytes,
            submitted: 0,
        })
    }

    /// Gates submitted since last reset
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    /// Staging buffers owned by this handle (never more than one)
    pub fn staged_buffers(&self) -> usize {
        usize::from(self.staging_bytes > 0)
    }

    fn submit(&self, command: Command) -> QcutResult<()> {
        self.commands
            .send(command)
            .map_err(|_| QcutError::BackendUnavailable("offload worker stopped".into()))
    }

    /// Take the staging buffer back from the worker, waiting if `block`
    fn reclaim(&mut self, block: bool) -> QcutResult<()> {
        if !self.in_flight {
            return Ok(());
        }
        let buffer = if block {
            self.recycled
                .recv()
                .map_err(|_| QcutError::BackendUnavailable("offload worker stopped".into()))?
        } else {
            match self.recycled.try_recv() {
                Ok(buffer) => buffer,
                Err(_) => return Ok(()),
            }
        };
        self.staging = Some(buffer);
        self.in_flight = false;
        Ok(())
    }

    fn stage(&mut self, phases: &[Complex64]) -> QcutResult<Vec<Complex64>> {
        // One staging buffer per handle; the next diagonal waits for the last
        self.reclaim(true)?;

        let mut buffer = match self.staging.take() {
            Some(buffer) => buffer,
            None => {
                let mut fresh = Vec::new();
                fresh
                    .try_reserve_exact(phases.len())
                    .map_err(|_| QcutError::CapacityExceeded {
                        qubits: self.num_qubits,
                        bytes: Some((phases.len() * std::mem::size_of::<Complex64>()) as u128),
                    })?;
                fresh
            }
        };

        buffer.clear();
        buffer.extend_from_slice(phases);
        self.staging_bytes = buffer.capacity() * std::mem::size_of::<Complex64>();
        Ok(buffer)
    }
}

impl Simulator for OffloadSimulator {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    fn precision(&self) -> Precision {
        self.precision
    }

    fn device(&self) -> Device {
        Device::Accelerator
    }

    fn reset(&mut self) -> QcutResult<()> {
        self.submitted = 0;
        self.submit(Command::Reset)
    }

    fn apply(&mut self, gate: &Gate<'_>) -> QcutResult<()> {
        gate.validate(self.num_qubits)?;

        let submitted = match *gate {
            Gate::H(q) => SubmittedGate::H(q),
            Gate::Rx(q, theta) => SubmittedGate::Rx(q, theta),
            Gate::Rzz(u, v, theta) => SubmittedGate::Rzz(u, v, theta),
            Gate::Diagonal(phases) => SubmittedGate::Diagonal(self.stage(phases)?),
        };
        let staged = matches!(submitted, SubmittedGate::Diagonal(_));

        self.submit(Command::Apply(submitted))?;
        self.submitted += 1;
        self.in_flight |= staged;
        Ok(())
    }

    fn finalize(&mut self, mode: &FinalizeMode) -> QcutResult<SimulationOutput<'_>> {
        let command = Command::Finalize {
            mode: mode.clone(),
            state: self.state.take(),
            probs: self.probs.take(),
        };
        self.submit(command)?;

        let reply = self
            .replies
            .recv()
            .map_err(|_| QcutError::SimulatorFailure("offload worker hung up".into()))?;

        self.state = reply.state;
        self.probs = reply.probs;
        self.resident_bytes = reply.resident_bytes;
        self.reclaim(false)?;
        let missing = || QcutError::InternalError("offload readout buffer missing".into());

        match reply.result? {
            Readout::Statevector => Ok(SimulationOutput::Statevector(
                self.state.as_ref().ok_or_else(missing)?,
            )),
            Readout::Probabilities => Ok(SimulationOutput::Probabilities(
                self.probs.as_ref().ok_or_else(missing)?,
            )),
            Readout::Expectation(value) => Ok(SimulationOutput::Expectation(value)),
        }
    }

    fn memory_bytes(&self) -> usize {
        self.resident_bytes
            + self.staging_bytes
            + self.state.as_ref().map_or(0, |s| s.bytes())
            + self.probs.as_ref().map_or(0, |p| p.bytes())
    }

    fn release(&mut self) {
        if self.reclaim(true).is_err() {
            warn!("offload worker stopped holding the staging buffer");
        }
        self.staging = None;
        self.in_flight = false;
        self.staging_bytes = 0;
        self.state = None;
        self.probs = None;
        self.resident_bytes = 0;
        if self.submit(Command::Release).is_err() {
            warn!("offload worker already stopped during release");
        }
    }
}

impl Drop for OffloadSimulator {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("offload worker panicked");
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
