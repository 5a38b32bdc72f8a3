//! Typed access to the DCG/NDCG vectors a ranking evaluator leaves in its
//! summary row.

pub mod fetch;
pub mod row;
pub mod snapshot;
pub mod sqlite;
pub mod util;

pub use fetch::{FetchError, fetch_field};
pub use row::{
    Column, ColumnKind, FromValue, InMemoryRow, InMemoryRowBuilder, ResultRow, RowError, Schema,
    Value, ValueError, ValueRef,
};
pub use snapshot::{ColumnNames, DCG_COLUMN, MetricsSnapshot, NDCG_COLUMN, build_metrics_snapshot};
