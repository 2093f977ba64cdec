//! Query executor collaborator
//!
//! The recovery scanner does not talk to PostgreSQL itself. The surrounding
//! driver implements [`QueryExecutor`] on top of its own connection and
//! cursor types; this crate only needs "run a query, fetch every row as
//! strings, close the cursor".

use tracing::warn;

/// A result row with positional string columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<String>,
}

impl Row {
    /// Build a row from its column values, in column order
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Row {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Column value at `idx`, `None` if the row is shorter
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values.get(idx).map(String::as_str)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the row has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Row {
    fn from(values: [S; N]) -> Self {
        Row::new(values)
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Row::new(iter)
    }
}

/// Read-only access to the database, supplied by the driver
///
/// Timeouts and cancellation are the implementor's business; the scanner
/// calls each method at most once per recovery.
pub trait QueryExecutor {
    /// Server-side cursor handle
    type Cursor;
    /// Error raised by the driver
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue a statement without parameters
    fn execute(&mut self, sql: &str) -> Result<Self::Cursor, Self::Error>;

    /// Fetch every remaining row of the cursor
    fn fetch_all(&mut self, cursor: &mut Self::Cursor) -> Result<Vec<Row>, Self::Error>;

    /// Release the cursor
    fn close(&mut self, cursor: Self::Cursor) -> Result<(), Self::Error>;
}

/// A cursor that is closed on every exit path
///
/// Call [`ScopedCursor::close`] on the success path to see close errors.
/// If the guard is dropped while still open (an early `?` return), the
/// cursor is closed in `Drop` and a close failure is only logged, so the
/// original error reaches the caller.
pub struct ScopedCursor<'a, E: QueryExecutor> {
    executor: &'a mut E,
    cursor: Option<E::Cursor>,
}

impl<'a, E: QueryExecutor> ScopedCursor<'a, E> {
    /// Execute `sql` and hold on to the resulting cursor
    pub fn open(executor: &'a mut E, sql: &str) -> Result<Self, E::Error> {
        let cursor = executor.execute(sql)?;
        Ok(ScopedCursor {
            executor,
            cursor: Some(cursor),
        })
    }

    /// Fetch every row of the cursor
    pub fn fetch_all(&mut self) -> Result<Vec<Row>, E::Error> {
        match self.cursor.as_mut() {
            Some(cursor) => self.executor.fetch_all(cursor),
            None => Ok(Vec::new()),
        }
    }

    /// Close the cursor, reporting any error
    pub fn close(mut self) -> Result<(), E::Error> {
        match self.cursor.take() {
            Some(cursor) => self.executor.close(cursor),
            None => Ok(()),
        }
    }
}

impl<E: QueryExecutor> Drop for ScopedCursor<'_, E> {
    fn drop(&mut self) {
        if let Some(cursor) = self.cursor.take() {
            if let Err(e) = self.executor.close(cursor) {
                warn!(error = %e, "Failed to close cursor while unwinding");
            }
        }
    }
}
