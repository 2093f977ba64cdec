//! Flat transaction id encoding for PostgreSQL
//!
//! PostgreSQL names a prepared transaction with a single string, while XA
//! wants a (format_id, gtrid, bqual) triple. The triple is flattened the way
//! pgjdbc does it, so prepared transactions can be recovered by either
//! driver:
//!
//! - `{format_id}_{base64(gtrid)}_{base64(bqual)}` for structured ids
//! - the raw string for unparsed ids

mod decode;
mod encode;

pub use decode::{decode_tid, parse_structured, ParseError};
pub use encode::encode_tid;

use pgxid_core::Xid;

/// Something that names a prepared transaction
///
/// Either an [`Xid`] built by the application, or a string read from
/// `pg_prepared_xacts` (possibly written by another client).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XidSource {
    /// An identifier, used as is
    Xid(Xid),
    /// A transaction id string, decoded with [`decode_tid`]
    Tid(String),
}

impl From<Xid> for XidSource {
    fn from(xid: Xid) -> Self {
        XidSource::Xid(xid)
    }
}

impl From<String> for XidSource {
    fn from(tid: String) -> Self {
        XidSource::Tid(tid)
    }
}

impl From<&str> for XidSource {
    fn from(tid: &str) -> Self {
        XidSource::Tid(tid.to_string())
    }
}

/// Turn an Xid or a transaction id string into an Xid
///
/// # Examples
///
/// ```
/// use pgxid_core::Xid;
/// use pgxid_wire::ensure_xid;
///
/// let xid = Xid::new(1, "abc", "xyz").unwrap();
/// assert_eq!(ensure_xid(xid.clone()), xid);
/// assert_eq!(ensure_xid("1_YWJj_eHl6"), xid);
/// assert!(ensure_xid("foreign").is_unparsed());
/// ```
pub fn ensure_xid(source: impl Into<XidSource>) -> Xid {
    match source.into() {
        XidSource::Xid(xid) => xid,
        XidSource::Tid(tid) => decode_tid(&tid),
    }
}
