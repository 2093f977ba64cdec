//! Unified error types for pgxid.
//!
//! This module provides a single error type that wraps the errors of the
//! member crates, for callers that use the facade only.

use pgxid_core::XidError;
use pgxid_recovery::RecoveryError;
use pgxid_wire::ParseError;
use thiserror::Error;

/// All pgxid errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Building or inspecting an identifier failed
    #[error(transparent)]
    Xid(#[from] XidError),

    /// A string is not a structured transaction id
    ///
    /// Only returned by [`parse_structured`](crate::parse_structured);
    /// [`decode_tid`](crate::decode_tid) never fails.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Recovery scan failed
    #[error(transparent)]
    Recovery(#[from] RecoveryError),
}

/// Result type for pgxid operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error came from the XA component rules.
    ///
    /// These are fixed by supplying corrected input.
    pub fn is_validation(&self) -> bool {
        match self {
            Error::Xid(e) => e.is_validation(),
            Error::Parse(ParseError::Invalid(e)) => e.is_validation(),
            _ => false,
        }
    }

    /// Check if this error came from a recovery scan.
    pub fn is_recovery(&self) -> bool {
        matches!(self, Error::Recovery(_))
    }
}
