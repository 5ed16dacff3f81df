//! # QCUT Engine
//!
//! Objective evaluation and the derivative-free optimizer loop.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qcut_engine // L7: Integration
//!     QaoaConfig // 실행 설정
//!         baseline(), edge_local(), accelerated(), memory_optimised()
//!     ResourceManager // 실행 자원 (비용 벡터, 위상 버퍼, 시뮬레이터)
//!     ObjectiveEvaluator // -<C> 평가
//!     OptimizerDriver // 제안/관측 루프
//!         NelderMead, GridSearch
//!         minimize() - 예산/수렴 정책
//!     QaoaRunner // 원클릭 실행
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qcut_engine::prelude::*;
//! use qcut_core::Graph;
//!
//! let config = QaoaConfig::baseline().with_layers(1).with_max_evaluations(40);
//! let result = QaoaRunner::new(Graph::cycle(4), config).run().unwrap();
//! println!("{}", result);
//! ```
//!
//! ## Custom Strategy
//!
//! ```rust
//! use qcut_engine::prelude::*;
//!
//! let mut grid = GridSearch::linspace(0.0, 1.0, 3, 2);
//! let out = minimize(&mut grid, |x| Ok(x[0] + x[1]), &MinimizeOptions::default()).unwrap();
//! assert_eq!(out.best_value, 0.0);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Configuration (Gantree: L7_Integration → QaoaConfig)
pub mod config;

/// Run resources (Gantree: L7_Integration → ResourceManager)
pub mod resources;

/// Objective (Gantree: L7_Integration → ObjectiveEvaluator)
pub mod objective;

/// Optimizer loop (Gantree: L7_Integration → OptimizerDriver)
pub mod optimizer;

/// One-call runner (Gantree: L7_Integration → QaoaRunner)
pub mod runner;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{QaoaConfig, Readout};
pub use objective::ObjectiveEvaluator;
pub use optimizer::{
    minimize, EvaluationRecord, GridSearch, MinimizeOptions, MinimizeOutcome, NelderMead,
    OptimizationState, OptimizerStrategy, StallWindow,
};
pub use resources::{EvaluationContext, ResourceManager};
pub use runner::{OptimizationResult, QaoaRunner};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qcut_engine::prelude::*;
    //! ```

    pub use crate::config::{QaoaConfig, Readout};
    pub use crate::objective::ObjectiveEvaluator;
    pub use crate::optimizer::{
        minimize, GridSearch, MinimizeOptions, MinimizeOutcome, NelderMead, OptimizationState,
        OptimizerStrategy,
    };
    pub use crate::resources::ResourceManager;
    pub use crate::runner::{OptimizationResult, QaoaRunner};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================
