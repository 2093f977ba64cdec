//! Transaction id encoding
//!
//! Renders an [`Xid`] as the flat string passed to `PREPARE TRANSACTION`:
//! - structured: `{format_id}_{base64(gtrid)}_{base64(bqual)}`
//! - unparsed: the raw gtrid, unchanged

use base64::Engine;
use pgxid_core::Xid;

/// Encode an Xid as a PostgreSQL transaction id
///
/// # Examples
///
/// ```
/// use pgxid_core::Xid;
/// use pgxid_wire::encode_tid;
///
/// let xid = Xid::new(1, "abc", "xyz").unwrap();
/// assert_eq!(encode_tid(&xid), "1_YWJj_eHl6");
/// ```
pub fn encode_tid(xid: &Xid) -> String {
    match xid.triple() {
        Some((format_id, gtrid, bqual)) => encode_triple(format_id, gtrid, bqual),
        None => xid.gtrid().to_string(),
    }
}

fn encode_triple(format_id: u32, gtrid: &str, bqual: &str) -> String {
    format!(
        "{}_{}_{}",
        format_id,
        encode_component(gtrid.as_bytes()),
        encode_component(bqual.as_bytes())
    )
}

/// Standard alphabet, padded
fn encode_component(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_structured() {
        let xid = Xid::new(1, "abc", "xyz").unwrap();
        assert_eq!(encode_tid(&xid), "1_YWJj_eHl6");
    }

    #[test]
    fn test_encode_pads_components() {
        let xid = Xid::new(42, "a", "ab").unwrap();
        assert_eq!(encode_tid(&xid), "42_YQ==_YWI=");
    }

    #[test]
    fn test_encode_empty_components() {
        let xid = Xid::new(0, "", "").unwrap();
        assert_eq!(encode_tid(&xid), "0__");
    }

    #[test]
    fn test_encode_max_format_id() {
        let xid = Xid::new(0x7fff_ffff, "g", "b").unwrap();
        assert!(encode_tid(&xid).starts_with("2147483647_"));
    }

    #[test]
    fn test_encode_components_never_contain_underscore() {
        // '?' and '>' land on the last two base64 symbols, '/' and '+'
        let xid = Xid::new(3, "???>>>", "~~~").unwrap();
        let tid = encode_tid(&xid);
        assert_eq!(tid.matches('_').count(), 2);
    }

    #[test]
    fn test_encode_unparsed_is_identity() {
        let xid = Xid::unparsed("some_random_prepared_name");
        assert_eq!(encode_tid(&xid), "some_random_prepared_name");
    }
}
