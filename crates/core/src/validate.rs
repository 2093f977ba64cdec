//! XA component validation
//!
//! The rules mirror what XA resource managers accept:
//! - format_id fits in a non-negative 32-bit signed integer
//! - gtrid and bqual are at most 64 bytes
//! - every byte of gtrid and bqual is printable ASCII (`0x20..0x7f`)

use crate::error::{Result, XidError};
use crate::xid::Component;

/// Largest accepted format_id
pub const MAX_FORMAT_ID: i64 = 0x7fff_ffff;

/// Largest accepted gtrid/bqual length, in bytes
pub const MAX_COMPONENT_LEN: usize = 64;

const PRINTABLE: std::ops::Range<u8> = 0x20..0x7f;

/// Validate a raw XA triple.
///
/// Checks run in order: format_id, gtrid, bqual. The first failure wins.
///
/// # Examples
///
/// ```
/// use pgxid_core::{validate, XidError};
///
/// assert!(validate(1, "abc", "xyz").is_ok());
/// assert_eq!(validate(-1, "abc", "xyz"), Err(XidError::InvalidFormatId(-1)));
/// ```
pub fn validate(format_id: i64, gtrid: &str, bqual: &str) -> Result<()> {
    check_format_id(format_id)?;
    check_component(Component::Gtrid, gtrid.as_bytes())?;
    check_component(Component::Bqual, bqual.as_bytes())
}

/// Check a format_id and narrow it to `u32`.
pub fn check_format_id(format_id: i64) -> Result<u32> {
    if !(0..=MAX_FORMAT_ID).contains(&format_id) {
        return Err(XidError::InvalidFormatId(format_id));
    }
    u32::try_from(format_id).map_err(|_| XidError::InvalidFormatId(format_id))
}

/// Check the length and charset of one component.
///
/// Works on bytes so decoded payloads can be checked before they are
/// turned into strings.
pub fn check_component(component: Component, bytes: &[u8]) -> Result<()> {
    if bytes.len() > MAX_COMPONENT_LEN {
        return Err(XidError::ComponentTooLong {
            component,
            len: bytes.len(),
        });
    }
    if let Some(position) = bytes.iter().position(|b| !PRINTABLE.contains(b)) {
        return Err(XidError::NonPrintableComponent {
            component,
            byte: bytes[position],
            position,
        });
    }
    Ok(())
}
