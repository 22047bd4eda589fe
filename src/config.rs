//! CLI configuration for the benchmark tool.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::driver::Target;

/// Which access-protocol realizations to run.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolKind {
    /// Row-oriented call-level interface.
    Odbc,
    /// Columnar record-batch streaming interface.
    Adbc,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "duckdb-bench",
    about = "DuckDB client-protocol scan latency benchmark"
)]
pub struct Config {
    /// ODBC data source name
    #[arg(long, default_value = "duckdbmemory", env = "DUCKDB_BENCH_DSN")]
    pub dsn: String,

    /// Path to the ADBC driver shared library
    #[arg(long, default_value = "libduckdb.so", env = "DUCKDB_BENCH_ADBC_DRIVER")]
    pub adbc_driver: PathBuf,

    /// Driver init entry point exported by the shared library
    #[arg(long, default_value = "duckdb_adbc_init")]
    pub adbc_entrypoint: String,

    /// Database location for the ADBC path (":memory:" for a transient instance)
    #[arg(long, default_value = ":memory:", env = "DUCKDB_BENCH_DATABASE")]
    pub database: String,

    /// Scale factor passed to the data generation call
    #[arg(long, default_value_t = 1.0)]
    pub scale_factor: f64,

    /// Number of timed iterations per protocol
    #[arg(long, default_value_t = 5)]
    pub runs: u32,

    /// Number of warmup iterations (excluded from measurements)
    #[arg(long, default_value_t = 0)]
    pub warmup: u32,

    /// Benchmark query executed each iteration
    #[arg(long, default_value = "SELECT * FROM lineitem")]
    pub query: String,

    /// Skip the data generation call (table already populated)
    #[arg(long, default_value_t = false)]
    pub skip_datagen: bool,

    /// Protocols to run, in order. Repeat or comma-separate for multiple.
    #[arg(long, value_enum, value_delimiter = ',')]
    pub protocol: Vec<ProtocolKind>,

    /// Print available protocols and exit
    #[arg(long, default_value_t = false)]
    pub list_protocols: bool,
}

impl Config {
    /// Connection parameters shared by both protocol bindings.
    pub fn target(&self) -> Target {
        Target {
            dsn: self.dsn.clone(),
            adbc_driver: self.adbc_driver.clone(),
            adbc_entrypoint: self.adbc_entrypoint.clone(),
            database: self.database.clone(),
        }
    }

    /// Selected protocols, defaulting to both when none are named.
    pub fn selected_protocols(&self) -> Vec<ProtocolKind> {
        if self.protocol.is_empty() {
            vec![ProtocolKind::Odbc, ProtocolKind::Adbc]
        } else {
            self.protocol.clone()
        }
    }
}
