//! # pgxid
//!
//! XA transaction identifiers for PostgreSQL two-phase commit.
//!
//! XA names a distributed transaction branch with a triple
//! `(format_id, gtrid, bqual)`; PostgreSQL names a prepared transaction with
//! one string. This crate maps between the two, using the same flattening
//! as pgjdbc so either driver can recover what the other prepared.
//!
//! ## Quick Start
//!
//! ```
//! use pgxid::prelude::*;
//!
//! // Build and encode an identifier for PREPARE TRANSACTION
//! let xid = Xid::new(1, "abc", "xyz")?;
//! let tid = encode_tid(&xid);
//! assert_eq!(tid, "1_YWJj_eHl6");
//!
//! // Decode what the server reports back
//! assert_eq!(decode_tid(&tid), xid);
//! assert!(decode_tid("created_by_someone_else").is_unparsed());
//! # Ok::<(), pgxid::Error>(())
//! ```
//!
//! ## Recovery
//!
//! Implement [`QueryExecutor`] for the driver's connection and call
//! [`recover`] to list every prepared transaction in `pg_prepared_xacts`.
//!
//! ## Crates
//!
//! - `pgxid-core` - [`Xid`] and validation
//! - `pgxid-wire` - [`encode_tid`] / [`decode_tid`]
//! - `pgxid-recovery` - [`recover`] and the executor trait

#![warn(missing_docs)]

mod error;

pub mod prelude;

pub use error::{Error, Result};

// Re-export identifier types
pub use pgxid_core::{
    validate, Component, RecoveryInfo, Xid, XidError, XidItem, MAX_COMPONENT_LEN, MAX_FORMAT_ID,
};

// Re-export the codec
pub use pgxid_wire::{decode_tid, encode_tid, ensure_xid, parse_structured, ParseError, XidSource};

// Re-export recovery
pub use pgxid_recovery::{
    recover, recover_with, BoxError, QueryExecutor, RecoveryError, RecoveryOptions,
    RecoveryReport, Row, ScopedCursor, PREPARED_XACTS_QUERY,
};

#[cfg(feature = "test-utils")]
pub use pgxid_recovery::{FailAt, MemoryExecutor};
