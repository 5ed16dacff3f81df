//! Accelerator utilization summary
//!
//! Gantree: L8_Benchmark → UtilizationSummary
//!
//! Reads a per-invocation timing table (`BeginNs,EndNs,DurationNs`) and a
//! hardware counter table with percentage columns, then applies the usual
//! rule-of-thumb verdict. Nothing in the core computes these verdicts.

use qcut_backend::InvocationTiming;
use qcut_core::{QcutError, QcutResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

// ============================================================================
// Thresholds
// ============================================================================

/// Below this wall-clock utilization the device is idle most of the run
pub const UNDER_UTILISED_PERCENT: f64 = 60.0;

/// High-activity threshold for VALU / memory-unit counters
pub const HIGH_PERCENT: f64 = 70.0;

/// Low-activity threshold for VALU / memory-unit counters
pub const LOW_PERCENT: f64 = 50.0;

/// L2 hit rate under which memory pressure is not absorbed by cache
pub const POOR_L2_HIT_PERCENT: f64 = 60.0;

// ============================================================================
// Counters
// ============================================================================

/// Run-averaged hardware counters, in percent
/// Gantree: CounterAverages // 카운터 평균
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterAverages {
    /// `GPUBusy` (optional column)
    pub gpu_busy: Option<f64>,
    /// `VALUUtilization`
    pub valu_utilization: f64,
    /// `MemUnitBusy`
    pub mem_unit_busy: f64,
    /// `L2CacheHit`
    pub l2_cache_hit: f64,
}

impl CounterAverages {
    /// Averages known up front
    pub fn new(valu_utilization: f64, mem_unit_busy: f64, l2_cache_hit: f64) -> Self {
        Self {
            gpu_busy: None,
            valu_utilization,
            mem_unit_busy,
            l2_cache_hit,
        }
    }

    /// Attach a `GPUBusy` average
    pub fn with_gpu_busy(mut self, gpu_busy: f64) -> Self {
        self.gpu_busy = Some(gpu_busy);
        self
    }
}

/// Rule-of-thumb classification
/// Gantree: Verdict // 판정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Wall-clock utilization under 60 %
    UnderUtilised,
    /// VALU high, memory unit quiet
    ComputeBound,
    /// Memory unit high, VALU quiet, poor L2 hit rate
    MemoryBound,
    /// None of the above
    Balanced,
}

impl Verdict {
    /// Apply the rules in order
    /// Gantree: classify(wall%, counters) -> Verdict // 판정 규칙
    pub fn classify(wall_utilization_percent: f64, counters: &CounterAverages) -> Self {
        let valu = counters.valu_utilization;
        let mem = counters.mem_unit_busy;

        if wall_utilization_percent < UNDER_UTILISED_PERCENT {
            Verdict::UnderUtilised
        } else if valu >= HIGH_PERCENT && mem <= LOW_PERCENT {
            Verdict::ComputeBound
        } else if mem >= HIGH_PERCENT && valu <= LOW_PERCENT && counters.l2_cache_hit < POOR_L2_HIT_PERCENT {
            Verdict::MemoryBound
        } else {
            Verdict::Balanced
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::UnderUtilised => write!(f, "Under-utilised"),
            Verdict::ComputeBound => write!(f, "Compute-bound"),
            Verdict::MemoryBound => write!(f, "Memory-bound"),
            Verdict::Balanced => write!(f, "Balanced / probably OK"),
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Wall-clock utilization plus counter averages and verdict
/// Gantree: UtilizationSummary // 활용도 요약
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtilizationSummary {
    /// Σ DurationNs
    pub busy_ns: u64,
    /// Wall-clock window
    pub wall_ns: u64,
    /// 100 · busy / wall
    pub wall_utilization_percent: f64,
    /// Counter averages
    pub counters: CounterAverages,
    /// Classification
    pub verdict: Verdict,
}

impl UtilizationSummary {
    /// Summary over `timings`, taking the wall window as first begin to last end
    pub fn from_timings(timings: &[InvocationTiming], counters: CounterAverages) -> Self {
        let begin = timings.iter().map(|t| t.begin_ns).min().unwrap_or(0);
        let end = timings.iter().map(|t| t.end_ns).max().unwrap_or(0);
        Self::with_wall_ns(timings, end.saturating_sub(begin), counters)
    }

    /// Summary over `timings` against an externally measured wall time
    pub fn with_wall_ns(timings: &[InvocationTiming], wall_ns: u64, counters: CounterAverages) -> Self {
        let busy_ns: u64 = timings.iter().map(|t| t.duration_ns).sum();
        let wall_utilization_percent = if wall_ns == 0 {
            0.0
        } else {
            100.0 * busy_ns as f64 / wall_ns as f64
        };

        Self {
            busy_ns,
            wall_ns,
            wall_utilization_percent,
            counters,
            verdict: Verdict::classify(wall_utilization_percent, &counters),
        }
    }

    /// Parse both tables and summarize
    /// Gantree: from_csv(timing, metrics) -> Result<Self> // CSV 요약
    pub fn from_csv(timing_csv: &str, metrics_csv: &str) -> QcutResult<Self> {
        let timings = parse_timings(timing_csv)?;
        let counters = parse_counters(metrics_csv)?;
        Ok(Self::from_timings(&timings, counters))
    }

    /// Read both tables from disk and summarize
    /// Gantree: from_files(timing_path, metrics_path) -> Result<Self> // 파일 요약
    pub fn from_files(timing_path: impl AsRef<Path>, metrics_path: impl AsRef<Path>) -> QcutResult<Self> {
        let timing_csv = fs::read_to_string(timing_path)?;
        let metrics_csv = fs::read_to_string(metrics_path)?;
        Self::from_csv(&timing_csv, &metrics_csv)
    }
}

impl fmt::Display for UtilizationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Wall-clock utilisation : {:5.1} %", self.wall_utilization_percent)?;
        if let Some(busy) = self.counters.gpu_busy {
            writeln!(f, "Avg GPUBusy            : {:5.1} %", busy)?;
        }
        writeln!(f, "Avg VALUUtilization    : {:5.1} %", self.counters.valu_utilization)?;
        writeln!(f, "Avg MemUnitBusy        : {:5.1} %", self.counters.mem_unit_busy)?;
        writeln!(f, "Avg L2CacheHit         : {:5.1} %", self.counters.l2_cache_hit)?;
        write!(f, "Verdict : {}", self.verdict)
    }
}

// ============================================================================
// Table Parsing
// ============================================================================

/// Header-indexed numeric table
struct Table<'a> {
    header: Vec<&'a str>,
    rows: Vec<Vec<&'a str>>,
}

impl<'a> Table<'a> {
    fn parse(text: &'a str) -> QcutResult<Self> {
        let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
        let header = lines
            .next()
            .ok_or_else(|| QcutError::FileError("table is empty".into()))?
            .split(',')
            .map(|c| c.trim().trim_matches('"'))
            .collect();
        let rows = lines
            .map(|l| l.split(',').map(|c| c.trim().trim_matches('"')).collect())
            .collect();
        Ok(Self { header, rows })
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| *h == name)
    }

    fn require(&self, name: &str) -> QcutResult<usize> {
        self.column(name)
            .ok_or_else(|| QcutError::FileError(format!("missing column '{}'", name)))
    }

    fn cell<T: std::str::FromStr>(&self, row: usize, col: usize) -> QcutResult<T> {
        let raw = self.rows[row].get(col).copied().unwrap_or("");
        raw.parse().map_err(|_| {
            QcutError::FileError(format!(
                "row {}: cannot parse '{}' in column '{}'",
                row + 1,
                raw,
                self.header[col]
            ))
        })
    }

    fn mean(&self, col: usize) -> QcutResult<f64> {
        if self.rows.is_empty() {
            return Err(QcutError::FileError("table has no rows".into()));
        }
        let mut sum = 0.0;
        for row in 0..self.rows.len() {
            sum += self.cell::<f64>(row, col)?;
        }
        Ok(sum / self.rows.len() as f64)
    }
}

/// Parse a `BeginNs,EndNs,DurationNs` table (extra columns ignored)
pub fn parse_timings(text: &str) -> QcutResult<Vec<InvocationTiming>> {
    let table = Table::parse(text)?;
    let begin = table.require("BeginNs")?;
    let end = table.require("EndNs")?;
    let duration = table.require("DurationNs")?;

    (0..table.rows.len())
        .map(|row| {
            Ok(InvocationTiming {
                begin_ns: table.cell(row, begin)?,
                end_ns: table.cell(row, end)?,
                duration_ns: table.cell(row, duration)?,
            })
        })
        .collect()
}

/// Average the counter columns of a metrics table
pub fn parse_counters(text: &str) -> QcutResult<CounterAverages> {
    let table = Table::parse(text)?;

    let gpu_busy = match table.column("GPUBusy") {
        Some(col) => Some(table.mean(col)?),
        None => None,
    };

    Ok(CounterAverages {
        gpu_busy,
        valu_utilization: table.mean(table.require("VALUUtilization")?)?,
        mem_unit_busy: table.mean(table.require("MemUnitBusy")?)?,
        l2_cache_hit: table.mean(table.require("L2CacheHit")?)?,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qcut_backend::profile::timings_to_csv;

    fn counters(valu: f64, mem: f64, l2: f64) -> CounterAverages {
        CounterAverages::new(valu, mem, l2)
    }

    #[test]
    fn test_verdict_rules() {
        assert_eq!(Verdict::classify(59.9, &counters(90.0, 10.0, 90.0)), Verdict::UnderUtilised);
        assert_eq!(Verdict::classify(80.0, &counters(70.0, 50.0, 10.0)), Verdict::ComputeBound);
        assert_eq!(Verdict::classify(80.0, &counters(50.0, 70.0, 59.0)), Verdict::MemoryBound);
        // Good cache hit rate keeps it balanced
        assert_eq!(Verdict::classify(80.0, &counters(50.0, 70.0, 60.0)), Verdict::Balanced);
        assert_eq!(Verdict::classify(60.0, &counters(60.0, 60.0, 60.0)), Verdict::Balanced);
    }

    #[test]
    fn test_wall_utilization_from_span() {
        let timings = vec![InvocationTiming::new(0, 40), InvocationTiming::new(60, 100)];
        let summary = UtilizationSummary::from_timings(&timings, counters(80.0, 20.0, 90.0));

        assert_eq!(summary.busy_ns, 80);
        assert_eq!(summary.wall_ns, 100);
        assert_relative_eq!(summary.wall_utilization_percent, 80.0);
        assert_eq!(summary.verdict, Verdict::ComputeBound);
    }

    #[test]
    fn test_external_wall_time() {
        let timings = vec![InvocationTiming::new(0, 40)];
        let summary = UtilizationSummary::with_wall_ns(&timings, 200, counters(80.0, 20.0, 90.0));
        assert_relative_eq!(summary.wall_utilization_percent, 20.0);
        assert_eq!(summary.verdict, Verdict::UnderUtilised);
    }

    #[test]
    fn test_empty_timings_under_utilised() {
        let summary = UtilizationSummary::from_timings(&[], counters(90.0, 10.0, 90.0));
        assert_eq!(summary.wall_utilization_percent, 0.0);
        assert_eq!(summary.verdict, Verdict::UnderUtilised);
    }

    #[test]
    fn test_from_csv() {
        let timings = timings_to_csv(&[
            InvocationTiming::new(100, 190),
            InvocationTiming::new(190, 200),
        ]);
        let metrics = "GPUBusy,VALUUtilization,MemUnitBusy,L2CacheHit\n\
                       90,40,80,50\n\
                       70,30,90,40\n";
        let summary = UtilizationSummary::from_csv(&timings, metrics).unwrap();

        assert_relative_eq!(summary.wall_utilization_percent, 100.0);
        assert_eq!(summary.counters.gpu_busy, Some(80.0));
        assert_relative_eq!(summary.counters.valu_utilization, 35.0);
        assert_relative_eq!(summary.counters.mem_unit_busy, 85.0);
        assert_eq!(summary.verdict, Verdict::MemoryBound);

        let text = summary.to_string();
        assert!(text.contains("Avg GPUBusy"));
        assert!(text.ends_with("Verdict : Memory-bound"));
    }

    #[test]
    fn test_from_files() {
        let dir = std::env::temp_dir().join(format!("qcut_util_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let timing_path = dir.join("timings.csv");
        let metrics_path = dir.join("metrics.csv");
        fs::write(&timing_path, timings_to_csv(&[InvocationTiming::new(0, 50)])).unwrap();
        fs::write(&metrics_path, "VALUUtilization,MemUnitBusy,L2CacheHit\n80,20,90\n").unwrap();

        let summary = UtilizationSummary::from_files(&timing_path, &metrics_path).unwrap();
        assert_eq!(summary.busy_ns, 50);
        assert_eq!(summary.verdict, Verdict::ComputeBound);

        let err = UtilizationSummary::from_files(dir.join("absent.csv"), &metrics_path).unwrap_err();
        assert!(matches!(err, QcutError::FileError(_)));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_column() {
        let err = parse_counters("VALUUtilization,MemUnitBusy\n1,2\n").unwrap_err();
        assert!(err.to_string().contains("L2CacheHit"));
    }

    #[test]
    fn test_bad_cell() {
        let err = parse_timings("BeginNs,EndNs,DurationNs\n1,x,3\n").unwrap_err();
        assert!(err.to_string().contains("EndNs"));
    }

    #[test]
    fn test_optional_gpu_busy() {
        let c = parse_counters("VALUUtilization,MemUnitBusy,L2CacheHit\n10,20,30\n").unwrap();
        assert_eq!(c.gpu_busy, None);
        assert_eq!(c, counters(10.0, 20.0, 30.0));
    }
}
