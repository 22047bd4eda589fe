//! Call-level (ODBC) realization.
//!
//! Fetches the result set row by row, decoding every column through a decode
//! path selected from its declared SQL type. Decoded values are discarded:
//! the benchmark measures transfer and decode cost, not downstream use.

use odbc_api::{
    sys::Date, Connection, ConnectionOptions, Cursor, CursorRow, DataType, Environment, Nullable,
    ResultSetMetadata,
};

use super::{
    datagen_statement, Diagnostic, DriverError, Protocol, ProtocolConnection, ScanStats, Target,
};

/// ODBC binding. Owns the driver environment for its lifetime; connections
/// borrow from it.
pub struct OdbcProtocol {
    env: Environment,
}

impl OdbcProtocol {
    /// Allocate the ODBC environment. Allocation failure is fatal.
    pub fn new() -> Result<Self, DriverError> {
        let env = Environment::new().map_err(|e| DriverError::fatal("environment allocation", e))?;
        Ok(Self { env })
    }
}

impl Protocol for OdbcProtocol {
    fn name(&self) -> &'static str {
        "ODBC"
    }

    fn connect<'a>(
        &'a self,
        target: &Target,
    ) -> Result<Box<dyn ProtocolConnection + 'a>, DriverError> {
        let connection_string = format!("DSN={}", target.dsn);
        let conn = self
            .env
            .connect_with_connection_string(&connection_string, ConnectionOptions::default())
            .map_err(|e| DriverError::fatal("connect", e))?;
        Ok(Box::new(OdbcConnection { conn }))
    }
}

struct OdbcConnection<'env> {
    conn: Connection<'env>,
}

impl ProtocolConnection for OdbcConnection<'_> {
    fn generate_data(&mut self, scale_factor: f64) -> Result<(), DriverError> {
        self.conn
            .execute(&datagen_statement(scale_factor), (), None)
            .map_err(query_error)?;
        Ok(())
    }

    fn run_scan(&mut self, query: &str) -> Result<ScanStats, DriverError> {
        // The cursor is the statement handle: dropped on every exit path of
        // this scope, so a failed fetch can no longer leak it.
        let mut cursor = match self.conn.execute(query, (), None).map_err(query_error)? {
            Some(cursor) => cursor,
            // Statement produced no result set (e.g. a DDL query).
            None => return Ok(ScanStats::default()),
        };

        let num_cols = cursor.num_result_cols().map_err(query_error)? as u16;
        let mut decodes = Vec::with_capacity(num_cols as usize);
        for col in 1..=num_cols {
            let data_type = cursor.col_data_type(col).map_err(query_error)?;
            decodes.push(ColumnDecode::for_type(data_type));
        }

        let mut stats = ScanStats::default();
        let mut text_buf = Vec::new();
        while let Some(mut row) = cursor.next_row().map_err(query_error)? {
            for (idx, &decode) in decodes.iter().enumerate() {
                decode_value(&mut row, idx as u16 + 1, decode, &mut text_buf)
                    .map_err(query_error)?;
            }
            stats.rows += 1;
        }
        Ok(stats)
    }
}

/// Decode path for one column, selected from its declared SQL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDecode {
    Integer,
    Real,
    /// Fixed-point types are transferred as text.
    DecimalText,
    /// Decoded into a year/month/day structure.
    Date,
    /// Fallback for everything else.
    Text,
}

impl ColumnDecode {
    pub fn for_type(data_type: DataType) -> Self {
        match data_type {
            DataType::Integer => ColumnDecode::Integer,
            DataType::Real => ColumnDecode::Real,
            DataType::Decimal { .. } | DataType::Numeric { .. } => ColumnDecode::DecimalText,
            DataType::Date => ColumnDecode::Date,
            _ => ColumnDecode::Text,
        }
    }
}

fn decode_value(
    row: &mut CursorRow<'_>,
    col: u16,
    decode: ColumnDecode,
    text_buf: &mut Vec<u8>,
) -> Result<(), odbc_api::Error> {
    match decode {
        ColumnDecode::Integer => {
            let mut value = Nullable::<i32>::null();
            row.get_data(col, &mut value)?;
        }
        ColumnDecode::Real => {
            let mut value = Nullable::<f32>::null();
            row.get_data(col, &mut value)?;
        }
        ColumnDecode::Date => {
            let mut value = Nullable::<Date>::null();
            row.get_data(col, &mut value)?;
        }
        ColumnDecode::DecimalText | ColumnDecode::Text => {
            text_buf.clear();
            row.get_text(col, text_buf)?;
        }
    }
    Ok(())
}

/// Map a driver error from the timed loop to the `Query` tier, carrying every
/// available diagnostic record verbatim.
fn query_error(err: odbc_api::Error) -> DriverError {
    let diagnostics = match &err {
        odbc_api::Error::Diagnostics { record, .. } => {
            vec![Diagnostic::new(
                String::from_utf8_lossy(&record.state.0).into_owned(),
                record.to_string(),
            )]
        }
        _ => vec![Diagnostic::new("HY000", err.to_string())],
    };
    DriverError::Query { diagnostics }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_columns_use_integer_decode() {
        assert_eq!(
            ColumnDecode::for_type(DataType::Integer),
            ColumnDecode::Integer
        );
    }

    #[test]
    fn real_columns_use_real_decode() {
        assert_eq!(ColumnDecode::for_type(DataType::Real), ColumnDecode::Real);
    }

    #[test]
    fn fixed_point_columns_decode_as_text() {
        assert_eq!(
            ColumnDecode::for_type(DataType::Decimal {
                precision: 15,
                scale: 2
            }),
            ColumnDecode::DecimalText
        );
        assert_eq!(
            ColumnDecode::for_type(DataType::Numeric {
                precision: 12,
                scale: 2
            }),
            ColumnDecode::DecimalText
        );
    }

    #[test]
    fn date_columns_use_date_decode() {
        assert_eq!(ColumnDecode::for_type(DataType::Date), ColumnDecode::Date);
    }

    #[test]
    fn everything_else_falls_back_to_text() {
        assert_eq!(ColumnDecode::for_type(DataType::Double), ColumnDecode::Text);
        assert_eq!(ColumnDecode::for_type(DataType::BigInt), ColumnDecode::Text);
        assert_eq!(ColumnDecode::for_type(DataType::Bit), ColumnDecode::Text);
    }
}
