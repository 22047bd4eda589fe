//! DuckDB Client-Protocol Latency Benchmark
//!
//! Measures full-table-scan latency of a DuckDB engine through two client
//! access protocols and reports the median wall-clock time of each:
//! - **ODBC**: row-oriented call-level interface, values decoded one column
//!   at a time by declared type
//! - **ADBC**: columnar interface, results streamed as Arrow record batches
//!
//! Run: `cargo run --release`
//! Run tests: `cargo test`

use log::{LevelFilter, SetLoggerError};
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

pub mod config;
pub mod driver;
pub mod report;
pub mod runner;

/// Initialize stderr logging. Benchmark results go to stdout; driver events
/// and diagnostics go through the logger.
pub fn initialize_logger(log_level: LevelFilter) -> Result<(), SetLoggerError> {
    const LOGGING_PATTERN: &str = "{d} {l} - {m}\n";

    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(LOGGING_PATTERN)))
        .build();

    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(log_level))
        .expect("valid logger config");

    let _handle = log4rs::init_config(config)?;
    Ok(())
}
