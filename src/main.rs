//! Benchmark binary: runs the selected protocol realizations against the
//! target engine and prints the comparison report.
//!
//! Usage:
//!   cargo run --release                         # both protocols, sf=1, 5 runs
//!   cargo run --release -- --protocol odbc      # single protocol
//!   cargo run --release -- --skip-datagen --runs 10

use std::process;

use anyhow::Context;
use clap::Parser;

use duckdb_bench::config::{Config, ProtocolKind};
use duckdb_bench::driver::adbc::AdbcProtocol;
use duckdb_bench::driver::odbc::OdbcProtocol;
use duckdb_bench::driver::Protocol;
use duckdb_bench::report::print_report;
use duckdb_bench::runner;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    if config.list_protocols {
        println!("Available protocols:");
        println!("  odbc  row-oriented call-level interface (via DSN)");
        println!("  adbc  columnar record-batch streaming (via driver library)");
        return Ok(());
    }

    duckdb_bench::initialize_logger(log::LevelFilter::Info)
        .context("failed to initialize logger")?;

    println!("DuckDB client-protocol scan benchmark");
    println!("  DSN:           {}", config.dsn);
    println!("  ADBC driver:   {}", config.adbc_driver.display());
    println!("  Database:      {}", config.database);
    println!("  Scale factor:  {}", config.scale_factor);
    println!("  Runs:          {}", config.runs);
    println!("  Warmup:        {}", config.warmup);
    println!("  Query:         {}", config.query);

    let target = config.target();
    let mut results = Vec::new();
    let mut failed = 0usize;

    for kind in config.selected_protocols() {
        let protocol: Box<dyn Protocol> = match kind {
            ProtocolKind::Odbc => match OdbcProtocol::new() {
                Ok(p) => Box::new(p),
                Err(e) => {
                    log::error!("[ODBC] {e}");
                    failed += 1;
                    continue;
                }
            },
            ProtocolKind::Adbc => Box::new(AdbcProtocol::new()),
        };

        println!("\n── {} ───────────────────────────────────────", protocol.name());
        match runner::run_protocol(protocol.as_ref(), &target, &config) {
            Ok(result) => results.push(result),
            // Fatal or query-tier failure: diagnostics surfaced, samples
            // discarded, remaining realizations still run.
            Err(e) => {
                log::error!("[{}] {e}", protocol.name());
                failed += 1;
            }
        }
    }

    if !results.is_empty() {
        print_report(&results);
    }

    if failed > 0 {
        process::exit(1);
    }
    Ok(())
}
