//! In-memory query executor
//!
//! Serves a fixed row set for any statement and keeps a log of what was
//! executed and which cursors were opened and closed. Useful for tests and
//! for dry runs of recovery against a captured `pg_prepared_xacts` dump.

use crate::executor::{QueryExecutor, Row};
use std::fmt;
use thiserror::Error;

/// Stage at which a [`MemoryExecutor`] should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    /// `execute` returns an error
    Execute,
    /// `fetch_all` returns an error
    Fetch,
    /// `close` returns an error
    Close,
}

impl fmt::Display for FailAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            FailAt::Execute => "execute",
            FailAt::Fetch => "fetch",
            FailAt::Close => "close",
        };
        f.write_str(stage)
    }
}

/// Error injected by a [`MemoryExecutor`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("injected {0} failure")]
pub struct MemoryError(pub FailAt);

/// Cursor handed out by a [`MemoryExecutor`]
#[derive(Debug)]
pub struct MemoryCursor {
    id: u64,
}

impl MemoryCursor {
    /// Sequence number of the cursor, starting at 0
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// A [`QueryExecutor`] backed by a fixed list of rows
#[derive(Debug, Default)]
pub struct MemoryExecutor {
    rows: Vec<Row>,
    fail_at: Option<FailAt>,
    executed: Vec<String>,
    opened: u64,
    closed: u64,
    close_attempts: u64,
}

impl MemoryExecutor {
    /// Executor that answers every query with `rows`
    pub fn new(rows: Vec<Row>) -> Self {
        MemoryExecutor {
            rows,
            ..Default::default()
        }
    }

    /// Make the given stage fail
    pub fn failing_at(mut self, stage: FailAt) -> Self {
        self.fail_at = Some(stage);
        self
    }

    /// Statements executed so far, in order
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    /// Cursors handed out so far
    pub fn opened_cursors(&self) -> u64 {
        self.opened
    }

    /// Cursors closed successfully
    pub fn closed_cursors(&self) -> u64 {
        self.closed
    }

    /// Calls to `close`, successful or not
    pub fn close_attempts(&self) -> u64 {
        self.close_attempts
    }

    /// Cursors handed out and not yet released by a `close` call
    pub fn open_cursors(&self) -> u64 {
        self.opened - self.close_attempts
    }

    fn check(&self, stage: FailAt) -> Result<(), MemoryError> {
        match self.fail_at {
            Some(fail_at) if fail_at == stage => Err(MemoryError(stage)),
            _ => Ok(()),
        }
    }
}

impl QueryExecutor for MemoryExecutor {
    type Cursor = MemoryCursor;
    type Error = MemoryError;

    fn execute(&mut self, sql: &str) -> Result<MemoryCursor, MemoryError> {
        self.executed.push(sql.to_string());
        self.check(FailAt::Execute)?;
        let cursor = MemoryCursor { id: self.opened };
        self.opened += 1;
        Ok(cursor)
    }

    fn fetch_all(&mut self, _cursor: &mut MemoryCursor) -> Result<Vec<Row>, MemoryError> {
        self.check(FailAt::Fetch)?;
        Ok(self.rows.clone())
    }

    fn close(&mut self, _cursor: MemoryCursor) -> Result<(), MemoryError> {
        self.close_attempts += 1;
        self.check(FailAt::Close)?;
        self.closed += 1;
        Ok(())
    }
}
