//! Benchmark reporting
//!
//! Gantree: L8_Benchmark → Reporter
//!
//! Markdown, JSON, CSV and plain-text renderings of benchmark results, plus
//! a report for a single optimization run.

use crate::suite::{BenchmarkResult, BenchmarkStatistics};
use crate::utilization::UtilizationSummary;
use qcut_engine::OptimizationResult;
use std::fmt::{self, Write};

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Markdown table
    Markdown,
    /// JSON
    Json,
    /// CSV
    Csv,
    /// Plain text summary
    Text,
}

impl ReportFormat {
    /// Parse from a format name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "text" | "txt" => Some(ReportFormat::Text),
            _ => None,
        }
    }
}

/// Benchmark reporter
/// Gantree: Reporter // 결과 리포팅
pub struct Reporter;

impl Reporter {
    // ========================================================================
    // Format Converters
    // ========================================================================

    /// Generate report in specified format
    pub fn report(results: &[BenchmarkResult], format: ReportFormat) -> String {
        match format {
            ReportFormat::Markdown => Self::to_markdown(results),
            ReportFormat::Json => Self::to_json(results),
            ReportFormat::Csv => Self::to_csv(results),
            ReportFormat::Text => Self::to_text(results),
        }
    }

    /// Convert results to Markdown table
    pub fn to_markdown(results: &[BenchmarkResult]) -> String {
        render(|out| write_markdown(out, results))
    }

    /// Convert results to JSON
    pub fn to_json(results: &[BenchmarkResult]) -> String {
        let stats = BenchmarkStatistics::from_results(results);

        let report = serde_json::json!({
            "statistics": stats,
            "results": results,
        });

        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Convert results to CSV
    pub fn to_csv(results: &[BenchmarkResult]) -> String {
        render(|out| write_csv(out, results))
    }

    /// Convert results to plain text summary
    pub fn to_text(results: &[BenchmarkResult]) -> String {
        render(|out| write_text(out, results))
    }

    // ========================================================================
    // Specialized Reports
    // ========================================================================

    /// Report for one optimization run, with timing and utilization if given
    pub fn run_report(result: &OptimizationResult, utilization: Option<&UtilizationSummary>) -> String {
        render(|out| {
            writeln!(out, "# QCUT Run Report\n")?;
            writeln!(
                out,
                "- **Graph**: {} ({} nodes, {} edges)",
                result.graph_name.as_deref().unwrap_or("unnamed"),
                result.num_nodes,
                result.num_edges
            )?;
            writeln!(out, "- **Config**: {}", result.config)?;
            writeln!(out, "- **Evaluations**: {} ({})", result.evaluations, result.state)?;
            writeln!(out, "- **Expected cut**: {:.6} / {}", result.expected_cut(), result.max_cut)?;
            writeln!(out, "- **Ratio**: {:.4}", result.approximation_ratio)?;
            writeln!(
                out,
                "- **Best assignment**: {} (p={:.4})",
                result.best_bitstring(),
                result.best_assignment_probability
            )?;
            writeln!(out, "- **Wall time**: {} ms\n", result.wall_time_ms)?;

            if let Some(summary) = result.timing_summary() {
                writeln!(out, "## Timing\n")?;
                writeln!(out, "{}\n", summary)?;
            }
            if let Some(util) = utilization {
                writeln!(out, "## Utilization\n")?;
                writeln!(out, "```text\n{}\n```", util)?;
            }
            Ok(())
        })
    }

    /// Preset comparison table (one row per preset)
    pub fn preset_report(results: &[BenchmarkResult]) -> String {
        render(|out| {
            writeln!(out, "# Preset Comparison\n")?;
            writeln!(out, "| Preset | Expected Cut | Ratio | Evals | Time(ms) | Bytes |")?;
            writeln!(out, "|--------|--------------|-------|-------|----------|-------|")?;
            for r in results {
                writeln!(
                    out,
                    "| {} | {:.4} | {:.4} | {} | {} | {} |",
                    r.preset, r.expected_cut, r.approximation_ratio, r.evaluations, r.time_ms, r.footprint_bytes
                )?;
            }
            Ok(())
        })
    }

    /// Node scaling table
    pub fn scaling_report(results: &[BenchmarkResult]) -> String {
        render(|out| {
            writeln!(out, "# Node Scaling Analysis\n")?;
            writeln!(out, "| Nodes | Edges | Ratio | Time(ms) | Time/Eval(ms) |")?;
            writeln!(out, "|-------|-------|-------|----------|---------------|")?;
            for r in results {
                let per_eval = r.time_ms as f64 / r.evaluations.max(1) as f64;
                writeln!(
                    out,
                    "| {} | {} | {:.4} | {} | {:.2} |",
                    r.nodes, r.edges, r.approximation_ratio, r.time_ms, per_eval
                )?;
            }
            Ok(())
        })
    }
}

// ============================================================================
// Writers
// ============================================================================

fn render(f: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail
    let _ = f(&mut output);
    output
}

fn write_markdown(out: &mut String, results: &[BenchmarkResult]) -> fmt::Result {
    writeln!(out, "# QCUT Benchmark Results\n")?;

    let stats = BenchmarkStatistics::from_results(results);
    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Benchmarks**: {}", stats.count)?;
    writeln!(out, "- **Avg Ratio**: {:.4}", stats.avg_ratio)?;
    writeln!(out, "- **Min Ratio**: {:.4}", stats.min_ratio)?;
    writeln!(out, "- **Convergence Rate**: {:.1}%", stats.convergence_rate * 100.0)?;
    writeln!(out, "- **Total Time**: {:.2}s\n", stats.total_time_ms as f64 / 1000.0)?;

    writeln!(out, "## Detailed Results\n")?;
    writeln!(
        out,
        "| Name | Nodes | Edges | Preset | L | <C> | Max | Ratio | Evals | Conv | Time(ms) |"
    )?;
    writeln!(
        out,
        "|------|-------|-------|--------|---|-----|-----|-------|-------|------|----------|"
    )?;

    for r in results {
        writeln!(
            out,
            "| {} | {} | {} | {} | {} | {:.4} | {} | {:.4} | {} | {} | {} |",
            r.name,
            r.nodes,
            r.edges,
            r.preset,
            r.layers,
            r.expected_cut,
            r.max_cut,
            r.approximation_ratio,
            r.evaluations,
            if r.converged { "✓" } else { "-" },
            r.time_ms
        )?;
    }
    Ok(())
}

fn write_csv(out: &mut String, results: &[BenchmarkResult]) -> fmt::Result {
    writeln!(
        out,
        "name,graph,nodes,edges,preset,layers,optimal_value,expected_cut,max_cut,approximation_ratio,evaluations,converged,time_ms,footprint_bytes"
    )?;

    for r in results {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            r.name,
            r.graph,
            r.nodes,
            r.edges,
            r.preset,
            r.layers,
            r.optimal_value,
            r.expected_cut,
            r.max_cut,
            r.approximation_ratio,
            r.evaluations,
            r.converged,
            r.time_ms,
            r.footprint_bytes
        )?;
    }
    Ok(())
}

fn write_text(out: &mut String, results: &[BenchmarkResult]) -> fmt::Result {
    let stats = BenchmarkStatistics::from_results(results);

    writeln!(out, "QCUT Benchmark Results")?;
    writeln!(out, "======================\n")?;

    writeln!(out, "Summary:")?;
    writeln!(out, "  Benchmarks run: {}", stats.count)?;
    writeln!(out, "  Average ratio: {:.4}", stats.avg_ratio)?;
    writeln!(out, "  Best ratio: {:.4}", stats.max_ratio)?;
    writeln!(out, "  Worst ratio: {:.4}", stats.min_ratio)?;
    writeln!(out, "  Average evaluations: {:.1}", stats.avg_evaluations)?;
    writeln!(out, "  Total time: {:.2}s\n", stats.total_time_ms as f64 / 1000.0)?;

    writeln!(out, "Individual Results:")?;
    for r in results {
        writeln!(
            out,
            "  {} ({}n/{}e, {}): <C>={:.4} of {}, {} evals, {}ms{}",
            r.name,
            r.nodes,
            r.edges,
            r.preset,
            r.expected_cut,
            r.max_cut,
            r.evaluations,
            r.time_ms,
            if r.converged { " [converged]" } else { "" }
        )?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
