//! Prepared transaction recovery
//!
//! Lists the transactions sitting in `pg_prepared_xacts` and rebuilds one
//! [`Xid`] per row, so a transaction manager can finish them after a crash.
//!
//! ## Recovery Sequence
//!
//! 1. Execute [`PREPARED_XACTS_QUERY`]
//! 2. Fetch every row, close the cursor
//! 3. Decode each `gid` (foreign ids become unparsed Xids)
//! 4. Attach `prepared`, `owner` and `database` as [`RecoveryInfo`]
//! 5. Apply [`RecoveryOptions`] filters, keeping row order
//!
//! ## Usage
//!
//! ```ignore
//! let (xids, report) = recover_with(&mut conn, &RecoveryOptions::for_database("app"))?;
//! println!("{}", report.summary());
//! ```

use crate::executor::{QueryExecutor, Row, ScopedCursor};
use pgxid_core::{RecoveryInfo, Xid};
use pgxid_wire::decode_tid;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

/// The recovery query; column order is part of the contract
pub const PREPARED_XACTS_QUERY: &str =
    "SELECT gid, prepared, owner, database FROM pg_prepared_xacts;";

const COLUMNS: [&str; 4] = ["gid", "prepared", "owner", "database"];

/// Boxed driver error
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// ============================================================================
// Recovery Options
// ============================================================================

/// Recovery options
///
/// The default keeps every row, which is what [`recover`] does.
#[derive(Debug, Clone, Default)]
pub struct RecoveryOptions {
    /// Keep only transactions prepared in this database
    pub database: Option<String>,
    /// Drop ids that are not structured XA triples
    pub skip_unparsed: bool,
}

impl RecoveryOptions {
    /// Only transactions of one database
    ///
    /// `pg_prepared_xacts` is cluster-wide, but a prepared transaction can
    /// only be committed or rolled back from a session in its own database.
    pub fn for_database(database: impl Into<String>) -> Self {
        RecoveryOptions {
            database: Some(database.into()),
            ..Default::default()
        }
    }

    /// Only structured XA ids
    pub fn parsed_only() -> Self {
        RecoveryOptions {
            skip_unparsed: true,
            ..Default::default()
        }
    }

    /// Set the database filter
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set whether unparsed ids are dropped
    pub fn with_skip_unparsed(mut self, skip: bool) -> Self {
        self.skip_unparsed = skip;
        self
    }

    fn keeps(&self, xid: &Xid) -> bool {
        if self.skip_unparsed && xid.is_unparsed() {
            return false;
        }
        match &self.database {
            Some(database) => xid.database() == Some(database.as_str()),
            None => true,
        }
    }
}

// ============================================================================
// Recovery Report
// ============================================================================

/// Recovery statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecoveryReport {
    /// Rows returned by the query
    pub rows_scanned: u64,
    /// Rows whose gid decoded to a structured XA triple
    pub structured: u64,
    /// Rows whose gid was kept as a raw string
    pub unparsed: u64,
    /// Rows dropped by the options
    pub filtered: u64,
    /// Total recovery time (microseconds)
    pub elapsed_micros: u64,
}

impl RecoveryReport {
    /// Number of identifiers returned
    pub fn recovered(&self) -> u64 {
        self.rows_scanned - self.filtered
    }

    /// Get human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Recovery complete: {} prepared transactions ({} structured, {} unparsed), {} filtered, {:.2}ms",
            self.rows_scanned,
            self.structured,
            self.unparsed,
            self.filtered,
            self.elapsed_micros as f64 / 1000.0,
        )
    }
}

// ============================================================================
// Recovery Error
// ============================================================================

/// Recovery errors
#[derive(Debug, Error)]
pub enum RecoveryError {
    /// The query could not be executed, fetched or closed
    #[error("recovery query failed: {0}")]
    QueryFailed(#[source] BoxError),

    /// A row is missing one of the four expected columns
    #[error("malformed row {row}: missing column {column}")]
    MalformedRow {
        /// Zero-based row index
        row: usize,
        /// Name of the missing column
        column: &'static str,
    },
}

impl RecoveryError {
    fn query_failed<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        RecoveryError::QueryFailed(Box::new(e))
    }
}

// ============================================================================
// Scanner
// ============================================================================

/// List every prepared transaction
///
/// Rows come back in the order the server returned them.
pub fn recover<E: QueryExecutor>(executor: &mut E) -> Result<Vec<Xid>, RecoveryError> {
    recover_with(executor, &RecoveryOptions::default()).map(|(xids, _)| xids)
}

/// List prepared transactions with filtering and statistics
pub fn recover_with<E: QueryExecutor>(
    executor: &mut E,
    options: &RecoveryOptions,
) -> Result<(Vec<Xid>, RecoveryReport), RecoveryError> {
    let start = Instant::now();
    let mut report = RecoveryReport::default();

    info!("Starting recovery of prepared transactions");

    let rows = fetch_rows(executor)?;
    let mut xids = Vec::with_capacity(rows.len());

    for (idx, row) in rows.iter().enumerate() {
        let xid = xid_from_row(idx, row)?;
        report.rows_scanned += 1;
        if xid.is_unparsed() {
            report.unparsed += 1;
        } else {
            report.structured += 1;
        }

        if options.keeps(&xid) {
            xids.push(xid);
        } else {
            debug!(row = idx, database = ?xid.database(), "Skipping prepared transaction");
            report.filtered += 1;
        }
    }

    report.elapsed_micros = start.elapsed().as_micros() as u64;
    info!("{}", report.summary());

    Ok((xids, report))
}

/// One execute/fetch/close round-trip; the cursor never outlives this call
fn fetch_rows<E: QueryExecutor>(executor: &mut E) -> Result<Vec<Row>, RecoveryError> {
    let mut cursor =
        ScopedCursor::open(executor, PREPARED_XACTS_QUERY).map_err(RecoveryError::query_failed)?;
    let rows = cursor.fetch_all().map_err(RecoveryError::query_failed)?;
    cursor.close().map_err(RecoveryError::query_failed)?;
    Ok(rows)
}

fn xid_from_row(idx: usize, row: &Row) -> Result<Xid, RecoveryError> {
    let column = move |pos: usize| {
        row.get(pos).ok_or(RecoveryError::MalformedRow {
            row: idx,
            column: COLUMNS[pos],
        })
    };

    let gid = column(0)?;
    let info = RecoveryInfo::new(column(1)?, column(2)?, column(3)?);

    // decode_tid never fails and its Xids carry no recovery info yet
    let xid = decode_tid(gid)
        .with_recovery_info(info)
        .expect("freshly decoded ids have no recovery info");
    Ok(xid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailAt, MemoryError, MemoryExecutor};

    fn row(gid: &str, database: &str) -> Row {
        Row::from([gid, "2024-01-01 00:00:00+00", "alice", database])
    }

    #[test]
    fn test_recover_single_row() {
        let mut executor = MemoryExecutor::new(vec![Row::from([
            "1_YWJj_eHl6",
            "2024-01-01",
            "alice",
            "db1",
        ])]);

        let xids = recover(&mut executor).unwrap();

        assert_eq!(xids.len(), 1);
        let xid = &xids[0];
        assert_eq!(xid.triple(), Some((1, "abc", "xyz")));
        assert_eq!(xid.prepared(), Some("2024-01-01"));
        assert_eq!(xid.owner(), Some("alice"));
        assert_eq!(xid.database(), Some("db1"));
        assert_eq!(executor.executed(), [PREPARED_XACTS_QUERY]);
    }

    #[test]
    fn test_recover_keeps_row_order_and_foreign_ids() {
        let mut executor = MemoryExecutor::new(vec![
            row("foreign_tx", "db1"),
            row("1_YWJj_eHl6", "db1"),
            row("2_Zw==_Yg==", "db2"),
        ]);

        let xids = recover(&mut executor).unwrap();

        let gtrids: Vec<_> = xids.iter().map(Xid::gtrid).collect();
        assert_eq!(gtrids, ["foreign_tx", "abc", "g"]);
        assert!(xids[0].is_unparsed());
        assert_eq!(xids[0].owner(), Some("alice"));
    }

    #[test]
    fn test_recover_empty() {
        let mut executor = MemoryExecutor::new(Vec::new());
        assert!(recover(&mut executor).unwrap().is_empty());
        assert_eq!(executor.closed_cursors(), 1);
    }

    #[test]
    fn test_malformed_row() {
        let mut executor = MemoryExecutor::new(vec![
            row("1_YWJj_eHl6", "db1"),
            Row::from(["2_Zw==_Yg==", "2024-01-01", "alice"]),
        ]);

        let err = recover(&mut executor).unwrap_err();
        assert!(matches!(
            err,
            RecoveryError::MalformedRow { row: 1, column: "database" }
        ));
        assert_eq!(executor.open_cursors(), 0);
    }

    #[test]
    fn test_empty_row_reports_gid() {
        let mut executor = MemoryExecutor::new(vec![Row::default()]);
        assert!(matches!(
            recover(&mut executor),
            Err(RecoveryError::MalformedRow { row: 0, column: "gid" })
        ));
    }

    #[test]
    fn test_undecodable_gids_are_not_errors() {
        let long = format!("1_{}_", "YWFh".repeat(22));
        let mut executor = MemoryExecutor::new(vec![
            row("1_%%%_eHl6", "db1"),
            row("2147483648_YWJj_eHl6", "db1"),
            row("1_AQ==_", "db1"),
            row(&long, "db1"),
        ]);

        let xids = recover(&mut executor).unwrap();

        assert_eq!(xids.len(), 4);
        for xid in &xids {
            assert!(xid.is_unparsed(), "{xid} should be unparsed");
            assert_eq!(xid.owner(), Some("alice"));
        }
        assert_eq!(xids[3].gtrid(), long);
    }

    #[test]
    fn test_query_failures() {
        for stage in [FailAt::Execute, FailAt::Fetch, FailAt::Close] {
            let mut executor = MemoryExecutor::new(vec![row("1_YWJj_eHl6", "db1")]).failing_at(stage);

            let err = recover(&mut executor).unwrap_err();
            match err {
                RecoveryError::QueryFailed(source) => {
                    assert_eq!(source.downcast_ref::<MemoryError>(), Some(&MemoryError(stage)));
                }
                other => panic!("expected QueryFailed, got {other:?}"),
            }
            assert_eq!(executor.open_cursors(), 0, "cursor leaked at {stage}");
        }
    }

    #[test]
    fn test_fetch_failure_still_closes_cursor() {
        let mut executor = MemoryExecutor::new(Vec::new()).failing_at(FailAt::Fetch);
        assert!(recover(&mut executor).is_err());
        assert_eq!(executor.closed_cursors(), 1);
    }

    #[test]
    fn test_recover_with_database_filter() {
        let mut executor = MemoryExecutor::new(vec![
            row("1_YWJj_eHl6", "db1"),
            row("2_Zw==_Yg==", "db2"),
            row("foreign", "db1"),
        ]);

        let (xids, report) =
            recover_with(&mut executor, &RecoveryOptions::for_database("db1")).unwrap();

        let gtrids: Vec<_> = xids.iter().map(Xid::gtrid).collect();
        assert_eq!(gtrids, ["abc", "foreign"]);
        assert_eq!(report.rows_scanned, 3);
        assert_eq!(report.structured, 2);
        assert_eq!(report.unparsed, 1);
        assert_eq!(report.filtered, 1);
        assert_eq!(report.recovered(), 2);
    }

    #[test]
    fn test_recover_with_parsed_only() {
        let mut executor = MemoryExecutor::new(vec![
            row("foreign", "db1"),
            row("1_YWJj_eHl6", "db1"),
        ]);

        let options = RecoveryOptions::parsed_only().with_database("db1");
        let (xids, report) = recover_with(&mut executor, &options).unwrap();

        assert_eq!(xids.len(), 1);
        assert!(!xids[0].is_unparsed());
        assert_eq!(report.filtered, 1);
    }

    #[test]
    fn test_filter_does_not_hide_malformed_rows() {
        let mut executor = MemoryExecutor::new(vec![Row::from(["foreign", "t", "o"])]);
        let options = RecoveryOptions::parsed_only();
        assert!(matches!(
            recover_with(&mut executor, &options),
            Err(RecoveryError::MalformedRow { row: 0, .. })
        ));
    }

    #[test]
    fn test_report_summary() {
        let report = RecoveryReport {
            rows_scanned: 3,
            structured: 2,
            unparsed: 1,
            filtered: 0,
            elapsed_micros: 1500,
        };
        assert_eq!(
            report.summary(),
            "Recovery complete: 3 prepared transactions (2 structured, 1 unparsed), 0 filtered, 1.50ms"
        );
    }
}
