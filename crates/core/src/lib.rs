//! Core types for pgxid
//!
//! This crate defines the XA transaction identifier and its rules:
//! - [`Xid`]: structured triple or unparsed raw string
//! - [`validate`]: format_id range, component length and charset
//! - [`XidError`]: everything that can go wrong building an [`Xid`]
//!
//! Encoding to and from the flat PostgreSQL string lives in `pgxid-wire`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod validate;
pub mod xid;

pub use error::{Result, XidError};
pub use validate::{check_component, check_format_id, validate, MAX_COMPONENT_LEN, MAX_FORMAT_ID};
pub use xid::{Component, RecoveryInfo, Xid, XidItem};
