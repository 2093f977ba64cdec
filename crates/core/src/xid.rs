//! The XA transaction identifier
//!
//! This module defines:
//! - [`Xid`]: a (format_id, gtrid, bqual) triple, or an unparsed raw string
//! - [`RecoveryInfo`]: metadata attached to identifiers found during recovery
//! - [`Component`] and [`XidItem`]: names and positional views of the triple

use crate::error::{Result, XidError};
use crate::validate::{check_component, check_format_id};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three XA components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    /// Format identifier
    FormatId,
    /// Global transaction identifier
    Gtrid,
    /// Branch qualifier
    Bqual,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::FormatId => "format_id",
            Component::Gtrid => "gtrid",
            Component::Bqual => "bqual",
        };
        f.write_str(name)
    }
}

/// Metadata read from `pg_prepared_xacts` alongside the transaction id
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecoveryInfo {
    /// When the transaction was prepared, as reported by the server
    pub prepared: Option<String>,
    /// Role that prepared the transaction
    pub owner: Option<String>,
    /// Database the transaction belongs to
    pub database: Option<String>,
}

impl RecoveryInfo {
    /// Create recovery metadata with all three fields present
    pub fn new(
        prepared: impl Into<String>,
        owner: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            prepared: Some(prepared.into()),
            owner: Some(owner.into()),
            database: Some(database.into()),
        }
    }

    fn is_empty(&self) -> bool {
        self.prepared.is_none() && self.owner.is_none() && self.database.is_none()
    }
}

/// Positional view of an [`Xid`], see [`Xid::item`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XidItem<'a> {
    /// Item 0
    FormatId(Option<u32>),
    /// Item 1
    Gtrid(&'a str),
    /// Item 2
    Bqual(Option<&'a str>),
}

/// A transaction identifier used for two-phase commit
///
/// An `Xid` is either:
/// - **structured**: a validated `(format_id, gtrid, bqual)` triple, or
/// - **unparsed**: a raw string with no format_id and no bqual, used for
///   transaction ids created by clients that don't follow the XA encoding.
///
/// The triple is immutable once built. Recovery metadata can be attached
/// once, see [`Xid::with_recovery_info`].
///
/// # Examples
///
/// ```
/// use pgxid_core::Xid;
///
/// let xid = Xid::new(1, "abc", "xyz").unwrap();
/// assert_eq!(xid.format_id(), Some(1));
/// assert_eq!(xid.gtrid(), "abc");
/// assert_eq!(xid.bqual(), Some("xyz"));
///
/// let raw = Xid::unparsed("some_random_prepared_name");
/// assert!(raw.is_unparsed());
/// assert_eq!(raw.bqual(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "XidRecord", into = "XidRecord")]
pub struct Xid {
    format_id: Option<u32>,
    gtrid: String,
    bqual: Option<String>,
    recovery: Option<RecoveryInfo>,
}

impl Xid {
    /// Number of positional items (format_id, gtrid, bqual)
    pub const LEN: usize = 3;

    /// Build a structured identifier from a raw triple.
    ///
    /// Fails if any component breaks the rules in [`validate`](crate::validate()).
    pub fn new(format_id: i64, gtrid: impl Into<String>, bqual: impl Into<String>) -> Result<Self> {
        let gtrid = gtrid.into();
        let bqual = bqual.into();

        let format_id = check_format_id(format_id)?;
        check_component(Component::Gtrid, gtrid.as_bytes())?;
        check_component(Component::Bqual, bqual.as_bytes())?;

        Ok(Xid {
            format_id: Some(format_id),
            gtrid,
            bqual: Some(bqual),
            recovery: None,
        })
    }

    /// Wrap a raw transaction id that is not an XA triple.
    ///
    /// No validation: the string is whatever the server accepted.
    pub fn unparsed(raw: impl Into<String>) -> Self {
        Xid {
            format_id: None,
            gtrid: raw.into(),
            bqual: None,
            recovery: None,
        }
    }

    /// Format identifier, `None` for unparsed ids
    pub fn format_id(&self) -> Option<u32> {
        self.format_id
    }

    /// Global transaction id, or the whole raw string for unparsed ids
    pub fn gtrid(&self) -> &str {
        &self.gtrid
    }

    /// Branch qualifier, `None` for unparsed ids
    pub fn bqual(&self) -> Option<&str> {
        self.bqual.as_deref()
    }

    /// True if this id carries only a raw string
    pub fn is_unparsed(&self) -> bool {
        self.format_id.is_none()
    }

    /// The XA triple, if this id is structured
    pub fn triple(&self) -> Option<(u32, &str, &str)> {
        match (self.format_id, &self.bqual) {
            (Some(format_id), Some(bqual)) => Some((format_id, &self.gtrid, bqual)),
            _ => None,
        }
    }

    /// Positional access to the three XA items.
    ///
    /// Negative indices count from the end, so `-1` is the bqual.
    pub fn item(&self, index: isize) -> Result<XidItem<'_>> {
        let len = Self::LEN as isize;
        let resolved = if index < 0 { index + len } else { index };
        match resolved {
            0 => Ok(XidItem::FormatId(self.format_id)),
            1 => Ok(XidItem::Gtrid(&self.gtrid)),
            2 => Ok(XidItem::Bqual(self.bqual.as_deref())),
            _ => Err(XidError::IndexOutOfRange(index)),
        }
    }

    /// Attach recovery metadata.
    ///
    /// Allowed once per identifier; a second call fails with
    /// [`XidError::RecoveryInfoAlreadyAttached`].
    pub fn with_recovery_info(mut self, info: RecoveryInfo) -> Result<Self> {
        if self.recovery.is_some() {
            return Err(XidError::RecoveryInfoAlreadyAttached);
        }
        self.recovery = Some(info);
        Ok(self)
    }

    /// Recovery metadata, if this id came from a recovery scan
    pub fn recovery_info(&self) -> Option<&RecoveryInfo> {
        self.recovery.as_ref()
    }

    /// Prepared timestamp reported by the server
    pub fn prepared(&self) -> Option<&str> {
        self.recovery.as_ref().and_then(|r| r.prepared.as_deref())
    }

    /// Role that prepared the transaction
    pub fn owner(&self) -> Option<&str> {
        self.recovery.as_ref().and_then(|r| r.owner.as_deref())
    }

    /// Database the transaction belongs to
    pub fn database(&self) -> Option<&str> {
        self.recovery.as_ref().and_then(|r| r.database.as_deref())
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.triple() {
            Some((format_id, gtrid, bqual)) => {
                write!(f, "Xid({}, '{}', '{}')", format_id, gtrid, bqual)
            }
            None => write!(f, "Xid('{}')", self.gtrid),
        }
    }
}

/// Flat serde representation of an [`Xid`]
///
/// Deserializing goes through [`Xid::new`] so the component rules hold for
/// serialized data too.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct XidRecord {
    format_id: Option<i64>,
    gtrid: String,
    #[serde(default)]
    bqual: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prepared: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    database: Option<String>,
}

impl From<Xid> for XidRecord {
    fn from(xid: Xid) -> Self {
        let info = xid.recovery.unwrap_or_default();
        XidRecord {
            format_id: xid.format_id.map(i64::from),
            gtrid: xid.gtrid,
            bqual: xid.bqual,
            prepared: info.prepared,
            owner: info.owner,
            database: info.database,
        }
    }
}

impl TryFrom<XidRecord> for Xid {
    type Error = XidError;

    fn try_from(record: XidRecord) -> Result<Self> {
        let xid = match (record.format_id, record.bqual) {
            (Some(format_id), bqual) => Xid::new(format_id, record.gtrid, bqual.unwrap_or_default())?,
            (None, None) => Xid::unparsed(record.gtrid),
            (None, Some(_)) => return Err(XidError::MissingFormatId),
        };

        let info = RecoveryInfo {
            prepared: record.prepared,
            owner: record.owner,
            database: record.database,
        };
        if info.is_empty() {
            Ok(xid)
        } else {
            xid.with_recovery_info(info)
        }
    }
}
