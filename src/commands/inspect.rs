use anyhow::{Context, Result, bail};
use regex::Regex;
use rusqlite::{Connection, OpenFlags, params};
use tracing::{info, warn};

use ranker_metrics::{ColumnNames, MetricsSnapshot};

use crate::cli::InspectArgs;

pub fn run(args: InspectArgs) -> Result<()> {
    info!(
        db_path = %args.db_path.display(),
        table = %args.table,
        row = args.row,
        "inspect requested"
    );

    let snapshot = load_snapshot(&args)?;
    log_snapshot(&snapshot);

    Ok(())
}

fn load_snapshot(args: &InspectArgs) -> Result<MetricsSnapshot> {
    if !is_plain_identifier(&args.table)? {
        bail!(
            "table name must be a plain SQL identifier: {:?}",
            args.table
        );
    }
    if !args.db_path.exists() {
        bail!("database file missing: {}", args.db_path.display());
    }

    let connection = Connection::open_with_flags(
        &args.db_path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("failed to open {}", args.db_path.display()))?;

    let sql = format!(
        "SELECT * FROM {} ORDER BY rowid LIMIT 1 OFFSET ?1",
        args.table
    );
    let mut statement = connection
        .prepare(&sql)
        .with_context(|| format!("failed to query table {}", args.table))?;

    let offset = i64::try_from(args.row).context("row ordinal out of range")?;
    let mut rows = statement.query(params![offset])?;
    let Some(row) = rows.next()? else {
        bail!("table {} has no row at ordinal {}", args.table, args.row);
    };

    let columns = ColumnNames {
        dcg: args.dcg_column.clone(),
        ndcg: args.ndcg_column.clone(),
    };
    let snapshot = MetricsSnapshot::from_row(row, &columns).with_context(|| {
        format!(
            "failed to read ranking metrics from {} row {}",
            args.table, args.row
        )
    })?;

    Ok(snapshot)
}

// The table name is spliced into SQL, so only bare identifiers are accepted.
fn is_plain_identifier(name: &str) -> Result<bool> {
    let identifier = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
        .context("failed to compile table identifier regex")?;
    Ok(identifier.is_match(name))
}

fn log_snapshot(snapshot: &MetricsSnapshot) {
    let dcg_len = snapshot.dcg().len();
    let ndcg_len = snapshot.ndcg().len();

    info!(
        truncation_level = snapshot.truncation_level(),
        ndcg_len, "loaded ranking metrics"
    );
    if dcg_len != ndcg_len {
        warn!(dcg_len, ndcg_len, "dcg and ndcg lengths differ");
    }

    for position in 1..=dcg_len.max(ndcg_len) {
        info!(
            position,
            dcg = %format_metric(snapshot.dcg_at(position)),
            ndcg = %format_metric(snapshot.ndcg_at(position)),
            "ranking metric"
        );
    }
}

fn format_metric(value: Option<f64>) -> String {
    value.map(|value| format!("{value:.6}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use ranker_metrics::FetchError;
    use ranker_metrics::util::encode_vector_blob;
    use rusqlite::{Connection, params};

    use super::{format_metric, is_plain_identifier, load_snapshot, run};
    use crate::cli::InspectArgs;

    fn write_results_db(path: &Path, rows: &[(Vec<f64>, Vec<f64>)]) {
        let connection = Connection::open(path).expect("create sqlite file");
        connection
            .execute_batch(
                "
                CREATE TABLE overall_results (
                  fold INTEGER NOT NULL,
                  DCG BLOB,
                  NDCG BLOB
                );
                ",
            )
            .expect("schema");
        for (fold, (dcg, ndcg)) in rows.iter().enumerate() {
            connection
                .execute(
                    "INSERT INTO overall_results(fold, DCG, NDCG) VALUES(?1, ?2, ?3)",
                    params![
                        fold as i64,
                        encode_vector_blob(dcg),
                        encode_vector_blob(ndcg)
                    ],
                )
                .expect("insert");
        }
    }

    fn inspect_args(path: &Path) -> InspectArgs {
        InspectArgs {
            db_path: path.to_path_buf(),
            table: "overall_results".to_string(),
            row: 0,
            dcg_column: "DCG".to_string(),
            ndcg_column: "NDCG".to_string(),
        }
    }

    #[test]
    fn inspect_reads_selected_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("results.sqlite");
        write_results_db(
            &db_path,
            &[
                (vec![3.1, 2.0, 0.5], vec![1.0, 0.9, 0.2]),
                (vec![1.5], vec![0.5]),
            ],
        );

        let mut args = inspect_args(&db_path);
        let first = load_snapshot(&args).expect("first row");
        assert_eq!(first.dcg(), &[3.1, 2.0, 0.5]);
        assert_eq!(first.ndcg(), &[1.0, 0.9, 0.2]);

        args.row = 1;
        let second = load_snapshot(&args).expect("second row");
        assert_eq!(second.dcg(), &[1.5]);

        run(args).expect("inspect should succeed");
    }

    #[test]
    fn inspect_surfaces_missing_column_as_fetch_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("results.sqlite");
        write_results_db(&db_path, &[(vec![3.1], vec![1.0])]);

        let mut args = inspect_args(&db_path);
        args.ndcg_column = "NDCG@10".to_string();

        let err = run(args).expect_err("NDCG@10 is not a column");
        match err.downcast_ref::<FetchError>() {
            Some(FetchError::ColumnNotFound { column }) => assert_eq!(column, "NDCG@10"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn inspect_rejects_table_names_that_are_not_identifiers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("results.sqlite");
        write_results_db(&db_path, &[(vec![3.1], vec![1.0])]);

        let mut args = inspect_args(&db_path);
        args.table = "overall_results; DROP TABLE overall_results".to_string();

        let err = run(args).expect_err("table name is rejected");
        assert!(err.to_string().contains("plain SQL identifier"));
    }

    #[test]
    fn inspect_fails_on_missing_row_and_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("results.sqlite");
        write_results_db(&db_path, &[(vec![3.1], vec![1.0])]);

        let mut args = inspect_args(&db_path);
        args.row = 5;
        let err = run(args).expect_err("only one row exists");
        assert!(err.to_string().contains("no row at ordinal 5"));

        let missing = inspect_args(&dir.path().join("absent.sqlite"));
        let err = run(missing).expect_err("file does not exist");
        assert!(err.to_string().contains("database file missing"));
    }

    #[test]
    fn plain_identifier_check_rejects_sql_fragments() {
        assert!(is_plain_identifier("overall_results").expect("regex"));
        assert!(is_plain_identifier("_fold2").expect("regex"));
        assert!(!is_plain_identifier("").expect("regex"));
        assert!(!is_plain_identifier("2fold").expect("regex"));
        assert!(!is_plain_identifier("\"quoted\"").expect("regex"));
    }

    #[test]
    fn format_metric_leaves_absent_positions_blank() {
        assert_eq!(format_metric(Some(0.5)), "0.500000");
        assert_eq!(format_metric(None), "");
    }
}
