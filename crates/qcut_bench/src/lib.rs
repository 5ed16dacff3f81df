//! # QCUT Bench
//!
//! Graph generators, benchmark suite, report formatting and utilization
//! summaries. Everything here sits outside the simulation core and only
//! talks to it through `QaoaRunner` and the recorded timings.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qcut_bench // L8: Benchmark
//!     GraphGenerator // 그래프 생성 (cycle, path, complete, star, G(n,p))
//!     BenchSuite // 벤치마크 스위트
//!         bench_graph(), run_presets(), run_node_scaling()
//!     Reporter // 결과 리포팅 (Markdown, JSON, CSV, Text)
//!     UtilizationSummary // 활용도 요약 + 판정
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qcut_bench::prelude::*;
//!
//! let mut suite = BenchSuite::new().with_max_evaluations(20);
//! let graph = suite.generator().cycle(4);
//! suite.bench_preset("c4", graph, "baseline").unwrap();
//! println!("{}", Reporter::to_markdown(suite.results()));
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Graph generators (Gantree: L8_Benchmark → GraphGenerator)
pub mod generators;

/// Benchmark suite (Gantree: L8_Benchmark → BenchSuite)
pub mod suite;

/// Report formatting (Gantree: L8_Benchmark → Reporter)
pub mod reporter;

/// Utilization summary (Gantree: L8_Benchmark → UtilizationSummary)
pub mod utilization;

// ============================================================================
// Re-exports
// ============================================================================

pub use generators::GraphGenerator;
pub use reporter::{ReportFormat, Reporter};
pub use suite::{BenchSuite, BenchmarkResult, BenchmarkStatistics, PRESET_NAMES};
pub use utilization::{parse_counters, parse_timings, CounterAverages, UtilizationSummary, Verdict};

// ============================================================================
// Prelude
// ============================================================================

/// Convenient imports for common use cases
pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use qcut_bench::prelude::*;
    //! ```

    pub use crate::generators::GraphGenerator;
    pub use crate::reporter::{ReportFormat, Reporter};
    pub use crate::suite::{BenchSuite, BenchmarkResult, BenchmarkStatistics};
    pub use crate::utilization::{CounterAverages, UtilizationSummary, Verdict};
}

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qcut_engine::{QaoaConfig, QaoaRunner};

    #[test]
    fn test_quick_suite_report() {
        let mut suite = BenchSuite::new().with_max_evaluations(30);
        let results = suite.run_quick().unwrap();
        assert_eq!(results.len(), 2);

        for format in [ReportFormat::Markdown, ReportFormat::Json, ReportFormat::Csv, ReportFormat::Text] {
            let report = Reporter::report(suite.results(), format);
            assert!(report.contains("quick_cycle4"));
        }
    }

    #[test]
    fn test_profiled_run_feeds_utilization() {
        let config = QaoaConfig::accelerated().with_layers(1).with_max_evaluations(6);
        let graph = GraphGenerator::new().star(4);
        let result = QaoaRunner::new(graph, config).run().unwrap();

        let metrics = "GPUBusy,VALUUtilization,MemUnitBusy,L2CacheHit\n95,85,30,80\n";
        let summary = UtilizationSummary::from_csv(&result.timings_csv(), metrics).unwrap();
        assert_eq!(summary.busy_ns, result.timings.iter().map(|t| t.duration_ns).sum::<u64>());
        assert!(summary.wall_utilization_percent <= 100.0);

        let report = Reporter::run_report(&result, Some(&summary));
        assert!(report.contains("## Timing"));
        assert!(report.contains("Verdict : "));
    }

    #[test]
    fn test_seeded_suite_is_reproducible() {
        let a = BenchSuite::with_seed(11).generator().erdos_renyi(8, 0.4);
        let b = BenchSuite::with_seed(11).generator().erdos_renyi(8, 0.4);
        assert_eq!(a, b);
    }
}
