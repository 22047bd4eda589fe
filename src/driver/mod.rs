//! Protocol bindings and the common `Protocol` trait.
//!
//! Two implementations are provided:
//! - [`odbc::OdbcProtocol`] — row-oriented call-level interface, column values
//!   decoded one at a time by declared type
//! - [`adbc::AdbcProtocol`] — columnar interface, results drained as Arrow
//!   record batches

pub mod adbc;
pub mod odbc;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Connection parameters for both protocol bindings.
///
/// The ODBC path connects through a pre-configured DSN; the ADBC path loads
/// the engine's driver shared library directly.
#[derive(Debug, Clone)]
pub struct Target {
    /// ODBC data source name (connection string becomes `DSN=<dsn>`).
    pub dsn: String,
    /// Path to the ADBC driver shared library (e.g. `libduckdb.so`).
    pub adbc_driver: PathBuf,
    /// Driver init entry point exported by the shared library.
    pub adbc_entrypoint: String,
    /// Database location: a file path, or `:memory:` for a transient instance.
    pub database: String,
}

impl Target {
    pub fn is_in_memory(&self) -> bool {
        self.database == ":memory:"
    }
}

/// One driver diagnostic record: SQLSTATE plus message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub state: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(state: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            state: state.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SQL State: {}, Error Message: {}", self.state, self.message)
    }
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(Diagnostic::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Two-tier driver error taxonomy.
///
/// `Fatal` covers environment/connection/handle-allocation failures: the
/// realization cannot proceed at all. `Query` covers execution failures inside
/// the timed loop: the run aborts and any samples collected so far are
/// discarded. Neither tier is ever retried.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("{operation} failed: {message}")]
    Fatal {
        operation: &'static str,
        message: String,
    },

    #[error("query execution failed: {}", render_diagnostics(.diagnostics))]
    Query { diagnostics: Vec<Diagnostic> },
}

impl DriverError {
    pub fn fatal(operation: &'static str, err: impl fmt::Display) -> Self {
        DriverError::Fatal {
            operation,
            message: err.to_string(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, DriverError::Fatal { .. })
    }

    /// Diagnostic records carried by a `Query` error (empty for `Fatal`).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            DriverError::Query { diagnostics } => diagnostics,
            DriverError::Fatal { .. } => &[],
        }
    }
}

/// Evidence that one scan iteration drained its entire result set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanStats {
    pub rows: u64,
    /// Record batches consumed (0 on the row-oriented path).
    pub batches: u64,
}

/// One access-protocol realization of the benchmark contract.
pub trait Protocol {
    /// Short label used in reports (e.g. `"ODBC"`).
    fn name(&self) -> &'static str;

    /// Open a session against the target engine.
    ///
    /// Any driver failure here is [`DriverError::Fatal`].
    fn connect<'a>(
        &'a self,
        target: &Target,
    ) -> Result<Box<dyn ProtocolConnection + 'a>, DriverError>;
}

/// An established session. Dropping the value releases the underlying
/// connection handle on every exit path.
pub trait ProtocolConnection {
    /// One-time synthetic data load (`CALL dbgen(sf = <scale>)`), issued
    /// before timing begins.
    fn generate_data(&mut self, scale_factor: f64) -> Result<(), DriverError>;

    /// One iteration body: open a fresh statement scope, execute the query,
    /// drain the full result set decoding each value by its declared type,
    /// and close the scope. Statement resources never outlive the call,
    /// including on error paths.
    fn run_scan(&mut self, query: &str) -> Result<ScanStats, DriverError>;
}

/// The fixed setup statement, parameterized by scale factor.
pub(crate) fn datagen_statement(scale_factor: f64) -> String {
    format!("CALL dbgen(sf = {scale_factor})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display_matches_console_contract() {
        let d = Diagnostic::new("42P01", "table does not exist");
        assert_eq!(
            d.to_string(),
            "SQL State: 42P01, Error Message: table does not exist"
        );
    }

    #[test]
    fn query_error_renders_every_record() {
        let err = DriverError::Query {
            diagnostics: vec![
                Diagnostic::new("HY000", "first"),
                Diagnostic::new("01000", "second"),
            ],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("HY000"));
        assert!(rendered.contains("first"));
        assert!(rendered.contains("01000"));
        assert!(rendered.contains("second"));
    }

    #[test]
    fn datagen_statement_embeds_scale_factor() {
        assert_eq!(datagen_statement(1.0), "CALL dbgen(sf = 1)");
        assert_eq!(datagen_statement(0.1), "CALL dbgen(sf = 0.1)");
    }

    #[test]
    fn in_memory_target_detection() {
        let mut target = Target {
            dsn: "duckdbmemory".into(),
            adbc_driver: "libduckdb.so".into(),
            adbc_entrypoint: "duckdb_adbc_init".into(),
            database: ":memory:".into(),
        };
        assert!(target.is_in_memory());
        target.database = "/tmp/bench.db".into();
        assert!(!target.is_in_memory());
    }
}
