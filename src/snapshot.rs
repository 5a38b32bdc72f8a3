use tracing::debug;

use crate::fetch::{FetchError, fetch_field};
use crate::row::ResultRow;

pub const DCG_COLUMN: &str = "DCG";
pub const NDCG_COLUMN: &str = "NDCG";

/// Names of the vector columns the ranking evaluator writes to its summary row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnNames {
    pub dcg: String,
    pub ndcg: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            dcg: DCG_COLUMN.to_string(),
            ndcg: NDCG_COLUMN.to_string(),
        }
    }
}

/// Per-position DCG and NDCG values read out of one evaluation summary row.
///
/// Both sequences are indexed by rank position, so index 0 holds the value at
/// cutoff 1. DCG is discounted by the natural logarithm of position + 1, and
/// NDCG is DCG divided by the DCG of the ideal ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct MetricsSnapshot {
    dcg: Vec<f64>,
    ndcg: Vec<f64>,
}

impl MetricsSnapshot {
    pub fn from_row<R: ResultRow>(row: &R, columns: &ColumnNames) -> Result<Self, FetchError> {
        build_metrics_snapshot(row, columns)
    }

    pub fn dcg(&self) -> &[f64] {
        &self.dcg
    }

    pub fn ndcg(&self) -> &[f64] {
        &self.ndcg
    }

    /// Number of rank positions reported for DCG.
    pub fn truncation_level(&self) -> usize {
        self.dcg.len()
    }

    /// DCG at the 1-based cutoff `k`.
    pub fn dcg_at(&self, k: usize) -> Option<f64> {
        value_at(&self.dcg, k)
    }

    /// NDCG at the 1-based cutoff `k`.
    pub fn ndcg_at(&self, k: usize) -> Option<f64> {
        value_at(&self.ndcg, k)
    }
}

fn value_at(values: &[f64], k: usize) -> Option<f64> {
    k.checked_sub(1).and_then(|index| values.get(index)).copied()
}

/// Reads the DCG and NDCG vectors out of `row`.
///
/// DCG is fetched first. Vectors are copied exactly as stored; lengths are not
/// checked against each other.
pub fn build_metrics_snapshot<R: ResultRow>(
    row: &R,
    columns: &ColumnNames,
) -> Result<MetricsSnapshot, FetchError> {
    let dcg: Vec<f64> = fetch_field(row, &columns.dcg)?;
    let ndcg: Vec<f64> = fetch_field(row, &columns.ndcg)?;

    debug!(
        dcg_len = dcg.len(),
        ndcg_len = ndcg.len(),
        "built ranking metrics snapshot"
    );

    Ok(MetricsSnapshot { dcg, ndcg })
}
