//! Wire encoding for pgxid
//!
//! This crate converts [`Xid`](pgxid_core::Xid) values to and from the
//! single-string transaction id PostgreSQL uses in `PREPARE TRANSACTION`,
//! `COMMIT PREPARED`, `ROLLBACK PREPARED` and `pg_prepared_xacts.gid`.
//!
//! ## Wire Encoding Rules
//!
//! | Xid kind | Transaction id |
//! |----------|----------------|
//! | Structured `(1, "abc", "xyz")` | `1_YWJj_eHl6` |
//! | Unparsed `"foo"` | `foo` |
//!
//! Decoding never fails: a string that is not a structured id
//! becomes an unparsed Xid holding the string verbatim.
//!
//! ## Examples
//!
//! ```
//! use pgxid_core::Xid;
//! use pgxid_wire::{decode_tid, encode_tid};
//!
//! let xid = Xid::new(1, "abc", "xyz").unwrap();
//! let tid = encode_tid(&xid);
//! assert_eq!(tid, "1_YWJj_eHl6");
//! assert_eq!(decode_tid(&tid), xid);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod tid;

// Re-export main types
pub use tid::{decode_tid, encode_tid, ensure_xid, parse_structured, ParseError, XidSource};
