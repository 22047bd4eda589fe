//! Benchmark runner: connect → data generation → warmup → timed loop.
//!
//! The clock brackets exactly one `run_scan` call per iteration, i.e. the
//! lifetime of that iteration's statement scope. Connection setup and data
//! generation happen before timing begins.

use std::time::Instant;

use crate::config::Config;
use crate::driver::{DriverError, Protocol, ScanStats, Target};
use crate::report::{SampleSet, ScanResult};

/// Run one protocol realization to completion.
///
/// A `Fatal` error (connect, handle allocation) propagates immediately. A
/// `Query` error during warmup or the timed loop aborts the run and discards
/// every sample collected so far; the caller decides whether remaining
/// realizations still proceed.
pub fn run_protocol(
    protocol: &dyn Protocol,
    target: &Target,
    config: &Config,
) -> Result<ScanResult, DriverError> {
    let name = protocol.name();

    print!("  Connecting...");
    let mut conn = protocol.connect(target)?;
    println!(" done");

    // --- Data generation (untimed) ---
    if config.skip_datagen {
        log::info!("[{name}] skipping data generation");
    } else {
        print!("  Generating data (sf = {})...", config.scale_factor);
        match conn.generate_data(config.scale_factor) {
            Ok(()) => println!(" done"),
            // Not fatal: the table may already exist from a previous run.
            Err(e) => {
                println!(" failed");
                log::warn!("[{name}] data generation failed: {e}");
            }
        }
    }

    // --- Warmup ---
    if config.warmup > 0 {
        print!("  Warmup ({} iterations)...", config.warmup);
        for _ in 0..config.warmup {
            conn.run_scan(&config.query)?;
        }
        println!(" done");
    }

    // --- Timed iterations ---
    print!(
        "  Running {} iteration{}...",
        config.runs,
        if config.runs == 1 { "" } else { "s" }
    );
    let mut samples = SampleSet::new();
    let mut stats = ScanStats::default();
    for _ in 0..config.runs {
        let start = Instant::now();
        stats = conn.run_scan(&config.query)?;
        samples.push(start.elapsed());
    }
    println!(" done");

    Ok(ScanResult {
        protocol: name,
        samples,
        stats,
    })
}
