//! Convenient imports for pgxid.
//!
//! ```
//! use pgxid::prelude::*;
//!
//! let xid = Xid::new(1, "abc", "xyz")?;
//! assert_eq!(encode_tid(&xid), "1_YWJj_eHl6");
//! # Ok::<(), pgxid::Error>(())
//! ```

// Error handling
pub use crate::error::{Error, Result};

// Identifier
pub use pgxid_core::{RecoveryInfo, Xid};

// Codec
pub use pgxid_wire::{decode_tid, encode_tid, ensure_xid};

// Recovery
pub use pgxid_recovery::{recover, recover_with, QueryExecutor, RecoveryOptions, Row};
