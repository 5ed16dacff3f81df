//! Per-invocation timing for QCUT
//!
//! Gantree: L2_Backend → Profiler
//!
//! Records begin/end/duration in nanoseconds since the profiler epoch for
//! every simulator invocation, and exports them as the `BeginNs,EndNs,
//! DurationNs` table consumed by utilization summaries.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// One timed invocation
/// Gantree: InvocationTiming // begin/end/duration ns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationTiming {
    /// Start, ns since epoch
    pub begin_ns: u64,
    /// End, ns since epoch
    pub end_ns: u64,
    /// `end_ns - begin_ns`
    pub duration_ns: u64,
}

impl InvocationTiming {
    /// Build from begin/end, clamping reversed inputs to zero duration
    pub fn new(begin_ns: u64, end_ns: u64) -> Self {
        Self {
            begin_ns,
            end_ns,
            duration_ns: end_ns.saturating_sub(begin_ns),
        }
    }
}

/// Aggregate over recorded timings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimingSummary {
    /// Number of invocations
    pub count: usize,
    /// Σ duration
    pub total_ns: u64,
    /// Mean duration
    pub mean_ns: f64,
    /// Shortest invocation
    pub min_ns: u64,
    /// Longest invocation
    pub max_ns: u64,
    /// First begin to last end
    pub span_ns: u64,
}

impl TimingSummary {
    /// Fraction of the span spent inside invocations
    pub fn busy_fraction(&self) -> f64 {
        if self.span_ns == 0 {
            0.0
        } else {
            self.total_ns as f64 / self.span_ns as f64
        }
    }
}

impl fmt::Display for TimingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} invocations, mean {:.3} ms, total {:.3} ms",
            self.count,
            self.mean_ns / 1e6,
            self.total_ns as f64 / 1e6
        )
    }
}

/// Invocation timer
/// Gantree: Profiler // 호출 타이머
#[derive(Debug, Clone)]
pub struct Profiler {
    epoch: Instant,
    records: Vec<InvocationTiming>,
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Profiler {
    /// Start a profiler; the epoch is now
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            records: Vec::new(),
        }
    }

    /// Nanoseconds since the epoch
    pub fn now_ns(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    /// Time `f` and record it
    /// Gantree: time(f) -> (R, InvocationTiming) // 측정
    pub fn time<R, F: FnOnce() -> R>(&mut self, f: F) -> (R, InvocationTiming) {
        let begin = self.now_ns();
        let result = f();
        let timing = InvocationTiming::new(begin, self.now_ns());
        self.records.push(timing);
        (result, timing)
    }

    /// Append an externally measured timing
    pub fn record(&mut self, timing: InvocationTiming) {
        self.records.push(timing);
    }

    /// All recorded timings
    pub fn records(&self) -> &[InvocationTiming] {
        &self.records
    }

    /// Forget recorded timings, keep the epoch
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Aggregate statistics
    pub fn summary(&self) -> TimingSummary {
        summarize(&self.records)
    }

    /// `BeginNs,EndNs,DurationNs` table
    pub fn to_csv(&self) -> String {
        timings_to_csv(&self.records)
    }
}

/// Aggregate statistics over `records`
pub fn summarize(records: &[InvocationTiming]) -> TimingSummary {
    if records.is_empty() {
        return TimingSummary::default();
    }

    let total_ns: u64 = records.iter().map(|r| r.duration_ns).sum();
    let first = records.iter().map(|r| r.begin_ns).min().unwrap_or(0);
    let last = records.iter().map(|r| r.end_ns).max().unwrap_or(0);

    TimingSummary {
        count: records.len(),
        total_ns,
        mean_ns: total_ns as f64 / records.len() as f64,
        min_ns: records.iter().map(|r| r.duration_ns).min().unwrap_or(0),
        max_ns: records.iter().map(|r| r.duration_ns).max().unwrap_or(0),
        span_ns: last.saturating_sub(first),
    }
}

/// Render timings as CSV with a `BeginNs,EndNs,DurationNs` header
pub fn timings_to_csv(records: &[InvocationTiming]) -> String {
    let mut csv = String::from("BeginNs,EndNs,DurationNs\n");
    for r in records {
        csv.push_str(&format!("{},{},{}\n", r.begin_ns, r.end_ns, r.duration_ns));
    }
    csv
}
