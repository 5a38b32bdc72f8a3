//! Reads evaluator summary rows straight out of SQLite.
//!
//! Vector-valued columns are stored as BLOBs of little-endian `f64` values.
//! Column names are matched exactly; when a query yields the same name twice
//! the last column wins.

use rusqlite::types::ValueRef as SqlValueRef;

use crate::row::{ResultRow, RowError, ValueRef};

impl ResultRow for rusqlite::Row<'_> {
    fn column_index(&self, name: &str) -> Option<usize> {
        let statement: &rusqlite::Statement<'_> = self.as_ref();
        statement
            .column_names()
            .iter()
            .rposition(|column| *column == name)
    }

    fn value_ref(&self, index: usize) -> Result<ValueRef<'_>, RowError> {
        let value = match self.get_ref(index)? {
            SqlValueRef::Null => ValueRef::Null,
            SqlValueRef::Integer(value) => ValueRef::Int64(value),
            SqlValueRef::Real(value) => ValueRef::Double(value),
            SqlValueRef::Text(bytes) => ValueRef::Text(
                std::str::from_utf8(bytes).map_err(|_| RowError::InvalidUtf8 { index })?,
            ),
            SqlValueRef::Blob(bytes) => ValueRef::Blob(bytes),
        };
        Ok(value)
    }
}
