//! Run-scoped resources for QCUT
//!
//! Gantree: L7_Integration → ResourceManager
//!
//! Everything one optimization run allocates: the shared graph and cost
//! table, the phase scratch and the simulator with its buffers. All of it is
//! allocated once up front and released when the manager is torn down or
//! dropped.

use crate::config::{QaoaConfig, Readout};
use log::debug;
use qcut_backend::{create_simulator, FinalizeMode, Observable, Simulator};
use qcut_core::{
    types::checked_bytes, CostRepresentation, CostVector, Device, Edge, Graph, PhaseBuffer,
    Precision, QcutError, QcutResult, RepresentationKind,
};
use std::sync::Arc;

/// Mutable view handed to the evaluator for one evaluation
pub struct EvaluationContext<'a> {
    /// Problem graph
    pub graph: &'a Graph,
    /// Cut values
    pub costs: &'a CostVector,
    /// Cost layer payload
    pub representation: &'a CostRepresentation,
    /// Readout
    pub mode: &'a FinalizeMode,
    /// Phase scratch
    pub scratch: &'a mut PhaseBuffer,
    /// Simulator
    pub simulator: &'a mut dyn Simulator,
}

/// Owner of per-run buffers
/// Gantree: ResourceManager // 실행 자원
pub struct ResourceManager {
    graph: Arc<Graph>,
    costs: Arc<CostVector>,
    edges: Arc<[Edge]>,
    representation: CostRepresentation,
    mode: FinalizeMode,
    scratch: PhaseBuffer,
    simulator: Box<dyn Simulator>,
    released: bool,
}

impl ResourceManager {
    /// Allocate everything `config` needs for `graph`
    /// Gantree: new(graph, config) -> Result<Self> // 일괄 할당
    pub fn new(graph: Arc<Graph>, config: &QaoaConfig) -> QcutResult<Self> {
        let n = graph.num_nodes();
        let limit = config.memory_limit_bytes();

        checked_bytes(n, Self::bytes_per_entry(config), limit)?;
        let simulator = create_simulator(n, config.precision, config.device, limit)?;
        Self::with_simulator(graph, config, simulator)
    }

    /// Allocate the cost side of `config` around a caller-supplied simulator
    pub fn with_simulator(
        graph: Arc<Graph>,
        config: &QaoaConfig,
        simulator: Box<dyn Simulator>,
    ) -> QcutResult<Self> {
        let n = graph.num_nodes();
        let limit = config.memory_limit_bytes();

        if simulator.num_qubits() != n {
            return Err(QcutError::ConfigError(format!(
                "simulator '{}' has {} qubits, graph has {} nodes",
                simulator.name(),
                simulator.num_qubits(),
                n
            )));
        }

        let costs = Arc::new(CostVector::compute_with_limit(&graph, config.normalization, limit)?);
        let edges: Arc<[Edge]> = graph.edges().into();

        let representation = match config.representation {
            RepresentationKind::DiagonalPhase => CostRepresentation::diagonal(Arc::clone(&costs)),
            RepresentationKind::EdgeLocalRotations => CostRepresentation::EdgeLocalRotations {
                edges: Arc::clone(&edges),
                normalization: config.normalization,
            },
        };

        let scratch = match config.representation {
            RepresentationKind::DiagonalPhase => PhaseBuffer::new(n)?,
            RepresentationKind::EdgeLocalRotations => PhaseBuffer::unallocated(),
        };

        let mode = match config.readout {
            Readout::Statevector => FinalizeMode::Statevector,
            Readout::Probabilities => FinalizeMode::Probabilities,
            Readout::Expectation => FinalizeMode::Expectation(match config.representation {
                RepresentationKind::DiagonalPhase => Observable::Diagonal(Arc::clone(&costs)),
                RepresentationKind::EdgeLocalRotations => {
                    Observable::maxcut(&graph, config.normalization)
                }
            }),
        };

        debug!(
            "Allocated resources for {} qubits: costs {} B, scratch {} B, simulator {}",
            n,
            costs.bytes(),
            scratch.bytes(),
            simulator.name()
        );

        Ok(Self {
            graph,
            costs,
            edges,
            representation,
            mode,
            scratch,
            simulator,
            released: false,
        })
    }

    /// Bytes per basis state across cost table, scratch, state and readout
    ///
    /// An accelerator run also holds a host copy of the readout and one
    /// staging buffer for diagonal phases.
    fn bytes_per_entry(config: &QaoaConfig) -> usize {
        let precision = config.precision;
        let diagonal = config.representation == RepresentationKind::DiagonalPhase;
        let readout = match config.readout {
            Readout::Statevector => precision.bytes_per_amplitude(),
            Readout::Probabilities => precision.bytes_per_real(),
            Readout::Expectation => 0,
        };

        let mut bytes = std::mem::size_of::<f64>() + precision.bytes_per_amplitude();
        if diagonal {
            // Phases are always complex f64
            bytes += Precision::Full.bytes_per_amplitude();
        }
        if config.readout == Readout::Probabilities {
            bytes += readout;
        }
        if config.device == Device::Accelerator {
            bytes += readout;
            if diagonal {
                bytes += Precision::Full.bytes_per_amplitude();
            }
        }
        bytes
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Problem graph
    pub fn graph(&self) -> &Arc<Graph> {
        &self.graph
    }

    /// Cut values, computed once
    pub fn costs(&self) -> &Arc<CostVector> {
        &self.costs
    }

    /// Shared edge list
    pub fn edges(&self) -> &Arc<[Edge]> {
        &self.edges
    }

    /// Cost layer payload handed to the builder
    pub fn representation(&self) -> &CostRepresentation {
        &self.representation
    }

    /// Readout used by every evaluation
    pub fn mode(&self) -> &FinalizeMode {
        &self.mode
    }

    /// Simulator
    pub fn simulator(&self) -> &dyn Simulator {
        self.simulator.as_ref()
    }

    /// Whether `teardown` has run
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Borrow everything one evaluation needs
    /// Gantree: split(&mut) -> EvaluationContext // 차용 분할
    pub fn split(&mut self) -> QcutResult<EvaluationContext<'_>> {
        if self.released {
            return Err(QcutError::InternalError(
                "resources used after teardown".into(),
            ));
        }

        Ok(EvaluationContext {
            graph: &self.graph,
            costs: &self.costs,
            representation: &self.representation,
            mode: &self.mode,
            scratch: &mut self.scratch,
            simulator: self.simulator.as_mut(),
        })
    }

    /// Heap bytes currently held
    /// Gantree: footprint_bytes(&self) -> usize // 메모리 사용량
    pub fn footprint_bytes(&self) -> usize {
        self.costs.bytes() + self.scratch.bytes() + self.simulator.memory_bytes()
    }

    /// Release scratch and simulator buffers
    /// Gantree: teardown(&mut) // 해제
    pub fn teardown(&mut self) {
        if self.released {
            return;
        }
        self.scratch.release();
        self.simulator.release();
        self.released = true;
        debug!("Released run resources for {} qubits", self.graph.num_nodes());
    }
}

impl Drop for ResourceManager {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("num_qubits", &self.graph.num_nodes())
            .field("representation", &self.representation.kind())
            .field("mode", &self.mode.name())
            .field("simulator", &self.simulator)
            .field("released", &self.released)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
