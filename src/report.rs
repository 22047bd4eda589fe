//! Report module: summary statistics over timing samples and the printed
//! comparison between protocol realizations.

use std::time::Duration;

use crate::driver::ScanStats;

/// Ordered collection of per-iteration elapsed-time measurements.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    samples: Vec<Duration>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Duration) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn as_slice(&self) -> &[Duration] {
        &self.samples
    }

    /// Median as an order statistic: sorts ascending and returns the element
    /// at index ⌊N/2⌋. Never interpolated, so the result is always a member
    /// of the sample set. `None` for an empty set.
    pub fn median(&self) -> Option<Duration> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted = self.samples.clone();
        sorted.sort();
        Some(sorted[sorted.len() / 2])
    }

    pub fn mean_us(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|d| d.as_secs_f64() * 1e6).sum();
        sum / self.samples.len() as f64
    }

    /// Nearest-rank percentile in microseconds.
    pub fn percentile_us(&self, pct: f64) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f64> = self
            .samples
            .iter()
            .map(|d| d.as_secs_f64() * 1e6)
            .collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let idx = ((pct / 100.0) * (sorted.len() - 1) as f64).round() as usize;
        sorted[idx.min(sorted.len() - 1)]
    }
}

/// Results from a completed benchmark run of one protocol realization.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub protocol: &'static str,
    pub samples: SampleSet,
    /// Drain evidence from the last timed iteration.
    pub stats: ScanStats,
}

impl ScanResult {
    pub fn median_ms(&self) -> f64 {
        self.samples
            .median()
            .map(|d| d.as_secs_f64() * 1e3)
            .unwrap_or(0.0)
    }

    /// Rows materialized per second, derived from the median iteration.
    pub fn rows_per_sec(&self) -> f64 {
        match self.samples.median() {
            Some(d) if d > Duration::ZERO => self.stats.rows as f64 / d.as_secs_f64(),
            _ => 0.0,
        }
    }
}

/// Print a formatted report comparing protocol results.
pub fn print_report(results: &[ScanResult]) {
    println!("\n{}", "=".repeat(72));
    println!("  DuckDB Client-Protocol Scan Benchmark Report");
    println!("{}", "=".repeat(72));

    for result in results {
        println!("\n  Protocol: {}", result.protocol);
        println!("  {}", "-".repeat(56));
        println!("  Runs:            {:>12}", result.samples.len());
        println!("  Rows drained:    {:>12}", result.stats.rows);
        if result.stats.batches > 0 {
            println!("  Batches drained: {:>12}", result.stats.batches);
        }
        println!("  Median:          {:>12.1} ms", result.median_ms());
        println!(
            "  Mean:            {:>12.1} ms",
            result.samples.mean_us() / 1000.0
        );
        println!(
            "  p95:             {:>12.1} ms",
            result.samples.percentile_us(95.0) / 1000.0
        );
        println!(
            "  p99:             {:>12.1} ms",
            result.samples.percentile_us(99.0) / 1000.0
        );
        println!("  Rows/sec:        {:>12.0}", result.rows_per_sec());
    }

    println!("\n{}", "=".repeat(72));

    // Comparison table
    if results.len() >= 2 {
        println!("\n  Comparison Summary:");
        println!(
            "  {:12} {:>12} {:>12} {:>14}",
            "Protocol", "Median (ms)", "p95 (ms)", "Rows/sec"
        );
        println!("  {}", "-".repeat(54));
        for r in results {
            println!(
                "  {:12} {:>12.1} {:>12.1} {:>14.0}",
                r.protocol,
                r.median_ms(),
                r.samples.percentile_us(95.0) / 1000.0,
                r.rows_per_sec(),
            );
        }
    }

    println!();
    for r in results {
        println!(
            "[{}] Median execution time: {:.1} ms",
            r.protocol,
            r.median_ms()
        );
    }
}
