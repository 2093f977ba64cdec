//! Recovery layer for pgxid
//!
//! This crate rebuilds transaction identifiers from the server's list of
//! prepared transactions:
//! - [`QueryExecutor`]: the driver-supplied query capability
//! - [`ScopedCursor`]: closes the cursor on every exit path
//! - [`recover`] / [`recover_with`]: scan `pg_prepared_xacts`
//! - `MemoryExecutor`: fixed-rows executor for tests (`test-utils` feature)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod executor;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod scanner;

// Re-export commonly used types
pub use executor::{QueryExecutor, Row, ScopedCursor};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::{FailAt, MemoryCursor, MemoryError, MemoryExecutor};
pub use scanner::{
    recover, recover_with, BoxError, RecoveryError, RecoveryOptions, RecoveryReport,
    PREPARED_XACTS_QUERY,
};
