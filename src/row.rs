//! Row abstraction for evaluator result rows.
//!
//! A row is a schema-described tuple of named, typed fields. Readers resolve a
//! column name to an index through the schema and then read the value at that
//! index with a caller-chosen static type.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RowError {
    #[error("column index {index} out of range for row with {len} columns")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("column '{column}' declared as {expected} but holds {actual}")]
    SchemaMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("column index {index} holds text that is not valid utf-8")]
    InvalidUtf8 { index: usize },

    #[error("failed to decode column index {index}")]
    Decode {
        index: usize,
        #[source]
        source: ValueError,
    },

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValueError {
    #[error("expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("vector blob of {byte_len} bytes is not a whole number of f64 values")]
    MalformedVector { byte_len: usize },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Int64,
    Double,
    Text,
    Vector { len: usize },
    Blob,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int64 => f.write_str("int64"),
            Self::Double => f.write_str("double"),
            Self::Text => f.write_str("text"),
            Self::Vector { len } => write!(f, "vector<double, {len}>"),
            Self::Blob => f.write_str("blob"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Int64(i64),
    Double(f64),
    Text(String),
    Vector(Vec<f64>),
    Blob(Vec<u8>),
}

impl Value {
    pub fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            Self::Null => ValueRef::Null,
            Self::Int64(value) => ValueRef::Int64(*value),
            Self::Double(value) => ValueRef::Double(*value),
            Self::Text(value) => ValueRef::Text(value),
            Self::Vector(values) => ValueRef::Vector(values),
            Self::Blob(bytes) => ValueRef::Blob(bytes),
        }
    }

    /// Whether this value can be stored in a column of the given kind. `Null`
    /// fits every kind.
    pub fn fits(&self, kind: ColumnKind) -> bool {
        match (self, kind) {
            (Self::Null, _) => true,
            (Self::Int64(_), ColumnKind::Int64) => true,
            (Self::Double(_), ColumnKind::Double) => true,
            (Self::Text(_), ColumnKind::Text) => true,
            (Self::Vector(values), ColumnKind::Vector { len }) => values.len() == len,
            (Self::Blob(_), ColumnKind::Blob) => true,
            _ => false,
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Vector(values) => format!("vector<double, {}>", values.len()),
            other => other.as_value_ref().type_name().to_string(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ValueRef<'a> {
    Null,
    Int64(i64),
    Double(f64),
    Text(&'a str),
    Vector(&'a [f64]),
    Blob(&'a [u8]),
}

impl ValueRef<'_> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int64(_) => "int64",
            Self::Double(_) => "double",
            Self::Text(_) => "text",
            Self::Vector(_) => "vector",
            Self::Blob(_) => "blob",
        }
    }
}

/// Decodes a borrowed row value into an owned value of a static type.
pub trait FromValue: Sized {
    fn from_value(value: ValueRef<'_>) -> Result<Self, ValueError>;
}

fn mismatch(expected: &'static str, value: ValueRef<'_>) -> ValueError {
    ValueError::TypeMismatch {
        expected,
        actual: value.type_name(),
    }
}

impl FromValue for f64 {
    fn from_value(value: ValueRef<'_>) -> Result<Self, ValueError> {
        match value {
            ValueRef::Double(value) => Ok(value),
            other => Err(mismatch("double", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: ValueRef<'_>) -> Result<Self, ValueError> {
        match value {
            ValueRef::Int64(value) => Ok(value),
            other => Err(mismatch("int64", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: ValueRef<'_>) -> Result<Self, ValueError> {
        match value {
            ValueRef::Text(value) => Ok(value.to_string()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromValue for Vec<f64> {
    fn from_value(value: ValueRef<'_>) -> Result<Self, ValueError> {
        match value {
            ValueRef::Vector(values) => Ok(values.to_vec()),
            ValueRef::Blob(bytes) => crate::util::decode_vector_blob(bytes),
            other => Err(mismatch("vector", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: ValueRef<'_>) -> Result<Self, ValueError> {
        match value {
            ValueRef::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// A finalized result row that can be read by column name.
pub trait ResultRow {
    /// Resolves a column name to its index, or `None` when the schema has no
    /// such column.
    fn column_index(&self, name: &str) -> Option<usize>;

    fn value_ref(&self, index: usize) -> Result<ValueRef<'_>, RowError>;

    /// Reads the value at `index` as `T`.
    fn get<T: FromValue>(&self, index: usize) -> Result<T, RowError> {
        let value = self.value_ref(index)?;
        T::from_value(value).map_err(|source| RowError::Decode { index, source })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

#[derive(Clone, Debug, Default)]
pub struct Schema {
    columns: Vec<Column>,
    by_name: HashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        let mut by_name = HashMap::with_capacity(columns.len());
        // Later columns shadow earlier ones with the same name.
        for (index, column) in columns.iter().enumerate() {
            by_name.insert(column.name.clone(), index);
        }
        Self { columns, by_name }
    }

    pub fn try_get_column_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct InMemoryRow {
    schema: Schema,
    values: Vec<Value>,
}

impl InMemoryRow {
    /// Builds a row, checking every value against its declared column kind.
    pub fn new(schema: Schema, values: Vec<Value>) -> Result<Self, RowError> {
        if values.len() != schema.len() {
            return Err(RowError::SchemaMismatch {
                column: String::from("<row>"),
                expected: format!("{} columns", schema.len()),
                actual: format!("{} values", values.len()),
            });
        }

        for (column, value) in schema.columns.iter().zip(values.iter()) {
            if !value.fits(column.kind) {
                return Err(RowError::SchemaMismatch {
                    column: column.name.clone(),
                    expected: column.kind.to_string(),
                    actual: value.describe(),
                });
            }
        }

        Ok(Self { schema, values })
    }

    pub fn builder() -> InMemoryRowBuilder {
        InMemoryRowBuilder::default()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl ResultRow for InMemoryRow {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.schema.try_get_column_index(name)
    }

    fn value_ref(&self, index: usize) -> Result<ValueRef<'_>, RowError> {
        self.values
            .get(index)
            .map(Value::as_value_ref)
            .ok_or(RowError::IndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }
}

/// Builds an [`InMemoryRow`] column by column, deriving each column kind from
/// the pushed value.
#[derive(Debug, Default)]
pub struct InMemoryRowBuilder {
    columns: Vec<Column>,
    values: Vec<Value>,
}

impl InMemoryRowBuilder {
    pub fn vector(self, name: &str, values: Vec<f64>) -> Self {
        let kind = ColumnKind::Vector { len: values.len() };
        self.column(name, kind, Value::Vector(values))
    }

    pub fn double(self, name: &str, value: f64) -> Self {
        self.column(name, ColumnKind::Double, Value::Double(value))
    }

    pub fn int64(self, name: &str, value: i64) -> Self {
        self.column(name, ColumnKind::Int64, Value::Int64(value))
    }

    pub fn text(self, name: &str, value: &str) -> Self {
        self.column(name, ColumnKind::Text, Value::Text(value.to_string()))
    }

    pub fn column(mut self, name: &str, kind: ColumnKind, value: Value) -> Self {
        self.columns.push(Column {
            name: name.to_string(),
            kind,
        });
        self.values.push(value);
        self
    }

    pub fn build(self) -> Result<InMemoryRow, RowError> {
        InMemoryRow::new(Schema::new(self.columns), self.values)
    }
}
