use thiserror::Error;
use tracing::debug;

use crate::row::{FromValue, ResultRow, RowError, ValueError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("column name must not be empty")]
    EmptyColumnName,

    #[error("could not find column '{column}'")]
    ColumnNotFound { column: String },

    #[error("could not decode column '{column}'")]
    Decode {
        column: String,
        #[source]
        source: ValueError,
    },

    #[error("could not read column '{column}'")]
    Row {
        column: String,
        #[source]
        source: RowError,
    },
}

impl FetchError {
    /// The column this error is about, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            Self::EmptyColumnName => None,
            Self::ColumnNotFound { column }
            | Self::Decode { column, .. }
            | Self::Row { column, .. } => Some(column),
        }
    }
}

/// Looks up `name` in the row's schema and reads its value as `T`.
///
/// A missing column is a contract violation between the evaluator that wrote
/// the row and the caller, so it is returned as [`FetchError::ColumnNotFound`]
/// and never recovered here.
pub fn fetch_field<T, R>(row: &R, name: &str) -> Result<T, FetchError>
where
    T: FromValue,
    R: ResultRow,
{
    if name.is_empty() {
        return Err(FetchError::EmptyColumnName);
    }

    let Some(index) = row.column_index(name) else {
        return Err(FetchError::ColumnNotFound {
            column: name.to_string(),
        });
    };

    debug!(column = name, index, "fetching result column");

    row.get::<T>(index).map_err(|err| match err {
        RowError::Decode { source, .. } => FetchError::Decode {
            column: name.to_string(),
            source,
        },
        source => FetchError::Row {
            column: name.to_string(),
            source,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::{FetchError, fetch_field};
    use crate::row::{InMemoryRow, ValueError};

    fn sample_row() -> InMemoryRow {
        InMemoryRow::builder()
            .int64("Fold", 0)
            .vector("DCG", vec![3.1, 2.0, 0.5])
            .build()
            .expect("sample row should build")
    }

    #[test]
    fn fetch_field_reads_typed_value_by_name() {
        let row = sample_row();

        let dcg: Vec<f64> = fetch_field(&row, "DCG").expect("DCG is present");
        assert_eq!(dcg, vec![3.1, 2.0, 0.5]);

        let fold: i64 = fetch_field(&row, "Fold").expect("Fold is present");
        assert_eq!(fold, 0);
    }

    #[test]
    fn fetch_field_reports_missing_column_by_name() {
        let row = sample_row();

        let err = fetch_field::<Vec<f64>, _>(&row, "NDCG").expect_err("NDCG is absent");
        assert!(matches!(&err, FetchError::ColumnNotFound { column } if column == "NDCG"));
        assert_eq!(err.to_string(), "could not find column 'NDCG'");
        assert_eq!(err.column(), Some("NDCG"));
    }

    #[test]
    fn fetch_field_rejects_empty_name() {
        let row = sample_row();

        let err = fetch_field::<i64, _>(&row, "").expect_err("empty name");
        assert!(matches!(err, FetchError::EmptyColumnName));
        assert_eq!(err.column(), None);
    }

    #[test]
    fn fetch_field_reports_type_mismatch_with_column_name() {
        let row = sample_row();

        let err = fetch_field::<Vec<f64>, _>(&row, "Fold").expect_err("Fold is a scalar");
        match err {
            FetchError::Decode { column, source } => {
                assert_eq!(column, "Fold");
                assert_eq!(
                    source,
                    ValueError::TypeMismatch {
                        expected: "vector",
                        actual: "int64",
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fetch_field_does_not_consume_the_row() {
        let row = sample_row();

        let first: Vec<f64> = fetch_field(&row, "DCG").expect("first read");
        let second: Vec<f64> = fetch_field(&row, "DCG").expect("second read");
        assert_eq!(first, second);
    }
}
