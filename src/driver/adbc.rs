//! Columnar (ADBC) realization.
//!
//! Loads the engine's driver shared library through the ADBC driver manager
//! and drains query results as Arrow record batches. Batch and stream
//! resources are released by `Drop` exactly once each, on every exit path.

use adbc_driver_manager::{ManagedConnection, ManagedDriver};
use adbc_core::options::{AdbcVersion, OptionDatabase, OptionValue};
use adbc_core::{Connection as _, Database as _, Driver as _, Statement as _};
use arrow_array::RecordBatchReader;

use super::{
    datagen_statement, Diagnostic, DriverError, Protocol, ProtocolConnection, ScanStats, Target,
};

/// ADBC binding. The driver library is loaded per connection, so a missing
/// or broken library surfaces as a connect-time fatal error.
pub struct AdbcProtocol;

impl AdbcProtocol {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AdbcProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl Protocol for AdbcProtocol {
    fn name(&self) -> &'static str {
        "ADBC"
    }

    fn connect<'a>(
        &'a self,
        target: &Target,
    ) -> Result<Box<dyn ProtocolConnection + 'a>, DriverError> {
        let mut driver = ManagedDriver::load_dynamic_from_filename(
            &target.adbc_driver,
            Some(target.adbc_entrypoint.as_bytes()),
            AdbcVersion::V100,
        )
        .map_err(|e| DriverError::fatal("driver load", e))?;

        // DuckDB's driver defaults to a transient in-memory instance when no
        // path option is set.
        let mut database = if target.is_in_memory() {
            driver.new_database()
        } else {
            driver.new_database_with_opts(vec![(
                OptionDatabase::Other("path".into()),
                OptionValue::String(target.database.clone()),
            )])
        }
        .map_err(|e| DriverError::fatal("database open", e))?;

        let connection = database
            .new_connection()
            .map_err(|e| DriverError::fatal("connect", e))?;

        Ok(Box::new(AdbcSession { connection }))
    }
}

struct AdbcSession {
    connection: ManagedConnection,
}

impl ProtocolConnection for AdbcSession {
    fn generate_data(&mut self, scale_factor: f64) -> Result<(), DriverError> {
        let mut statement = self
            .connection
            .new_statement()
            .map_err(|e| DriverError::fatal("statement allocation", e))?;
        statement
            .set_sql_query(datagen_statement(scale_factor))
            .map_err(query_error)?;
        let reader = statement.execute().map_err(query_error)?;
        drain(reader)?;
        Ok(())
    }

    fn run_scan(&mut self, query: &str) -> Result<ScanStats, DriverError> {
        // Statement and stream both live inside this scope; drop releases
        // them regardless of which path exits.
        let mut statement = self
            .connection
            .new_statement()
            .map_err(|e| DriverError::fatal("statement allocation", e))?;
        statement.set_sql_query(query).map_err(query_error)?;
        let reader = statement.execute().map_err(query_error)?;
        drain(reader)
    }
}

/// Pull record batches until the end-of-stream sentinel, counting rows and
/// batches. Each batch is dropped as soon as it has been counted; the stream
/// itself is dropped when this function returns, on success or error.
pub(crate) fn drain<R: RecordBatchReader>(reader: R) -> Result<ScanStats, DriverError> {
    let mut stats = ScanStats::default();
    for batch in reader {
        let batch = batch.map_err(|e| DriverError::Query {
            diagnostics: vec![Diagnostic::new("HY000", e.to_string())],
        })?;
        stats.rows += batch.num_rows() as u64;
        stats.batches += 1;
    }
    Ok(stats)
}

fn query_error(err: adbc_core::error::Error) -> DriverError {
    let state: String = err
        .sqlstate
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| (c as u8) as char)
        .collect();
    let state = if state.is_empty() {
        "HY000".to_string()
    } else {
        state
    };
    DriverError::Query {
        diagnostics: vec![Diagnostic::new(state, err.to_string())],
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use arrow_array::{ArrayRef, Int32Array, RecordBatch, RecordBatchIterator, RecordBatchReader};
    use arrow_schema::{ArrowError, DataType, Field, Schema, SchemaRef};

    use super::*;

    fn test_schema() -> SchemaRef {
        Arc::new(Schema::new(vec![Field::new("v", DataType::Int32, false)]))
    }

    /// Batch plus a retained handle to its column buffer. While the batch is
    /// alive the Arc count is 2; once the batch has been released it is 1.
    fn tracked_batch(schema: &SchemaRef, rows: i32) -> (RecordBatch, ArrayRef) {
        let values: ArrayRef = Arc::new(Int32Array::from_iter_values(0..rows));
        let batch = RecordBatch::try_new(schema.clone(), vec![values.clone()]).unwrap();
        (batch, values)
    }

    /// Wrapper that counts how many times the stream itself is released.
    struct CountingReader<R> {
        inner: R,
        drops: Arc<AtomicUsize>,
    }

    impl<R: RecordBatchReader> Iterator for CountingReader<R> {
        type Item = Result<RecordBatch, ArrowError>;

        fn next(&mut self) -> Option<Self::Item> {
            self.inner.next()
        }
    }

    impl<R: RecordBatchReader> RecordBatchReader for CountingReader<R> {
        fn schema(&self) -> SchemaRef {
            self.inner.schema()
        }
    }

    impl<R> Drop for CountingReader<R> {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn drain_consumes_every_batch_and_releases_stream_once() {
        let schema = test_schema();
        let (batches, columns): (Vec<_>, Vec<_>) = [4, 5, 6]
            .iter()
            .map(|&rows| tracked_batch(&schema, rows))
            .unzip();
        let batches: Vec<Result<RecordBatch, ArrowError>> = batches.into_iter().map(Ok).collect();
        let drops = Arc::new(AtomicUsize::new(0));
        let reader = CountingReader {
            inner: RecordBatchIterator::new(batches, schema),
            drops: drops.clone(),
        };

        let stats = drain(reader).unwrap();
        assert_eq!(stats.batches, 3);
        assert_eq!(stats.rows, 15);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        // Every batch released exactly once: only the retained handle is left.
        for column in &columns {
            assert_eq!(Arc::strong_count(column), 1);
        }
    }

    #[test]
    fn drain_of_empty_stream_reports_nothing() {
        let schema = test_schema();
        let batches: Vec<Result<RecordBatch, ArrowError>> = Vec::new();
        let reader = RecordBatchIterator::new(batches, schema);
        let stats = drain(reader).unwrap();
        assert_eq!(stats.batches, 0);
        assert_eq!(stats.rows, 0);
    }

    #[test]
    fn drain_error_still_releases_stream_and_batches() {
        let schema = test_schema();
        let (batch, column) = tracked_batch(&schema, 2);
        let batches = vec![
            Ok(batch),
            Err(ArrowError::ComputeError("stream broke".into())),
        ];
        let drops = Arc::new(AtomicUsize::new(0));
        let reader = CountingReader {
            inner: RecordBatchIterator::new(batches, schema),
            drops: drops.clone(),
        };

        let err = drain(reader).unwrap_err();
        assert!(err.to_string().contains("stream broke"));
        assert_eq!(drops.load(Ordering::SeqCst), 1);
        // The batch consumed before the failure was still released.
        assert_eq!(Arc::strong_count(&column), 1);
    }
}
