//! Error types for transaction identifiers
//!
//! Every failure here is raised while constructing or inspecting an [`Xid`],
//! and is recoverable by the caller supplying corrected input.
//!
//! [`Xid`]: crate::Xid

use crate::xid::Component;
use thiserror::Error;

/// Errors raised by XA identifier validation and access
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XidError {
    /// format_id outside `0..=0x7fffffff`
    #[error("format_id must be a non-negative 32-bit integer, got {0}")]
    InvalidFormatId(i64),

    /// Component longer than 64 bytes
    #[error("{component} must be no longer than 64 bytes, got {len}")]
    ComponentTooLong {
        /// Which component was rejected
        component: Component,
        /// Its byte length
        len: usize,
    },

    /// Component contains a byte outside `0x20..0x7f`
    #[error("{component} must contain only printable characters (byte 0x{byte:02x} at {position})")]
    NonPrintableComponent {
        /// Which component was rejected
        component: Component,
        /// The offending byte
        byte: u8,
        /// Byte offset of the offending byte
        position: usize,
    },

    /// Positional access past the three XA items
    #[error("index out of range: {0}")]
    IndexOutOfRange(isize),

    /// Recovery metadata can only be attached once
    #[error("recovery info already attached")]
    RecoveryInfoAlreadyAttached,

    /// A serialized record carried a branch qualifier without a format_id
    #[error("bqual present without format_id")]
    MissingFormatId,
}

impl XidError {
    /// Check if this error came from the component rules.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            XidError::InvalidFormatId(_)
                | XidError::ComponentTooLong { .. }
                | XidError::NonPrintableComponent { .. }
        )
    }
}

/// Result type for identifier operations
pub type Result<T> = std::result::Result<T, XidError>;
