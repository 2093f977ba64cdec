//! Transaction id decoding
//!
//! Two stages:
//! 1. [`parse_structured`] tries to read a `{format_id}_{b64}_{b64}` string
//!    back into a validated triple.
//! 2. [`decode_tid`] falls back to an unparsed [`Xid`] when stage 1 fails,
//!    so ids written by other clients stay recoverable.

use base64::Engine;
use once_cell::sync::Lazy;
use pgxid_core::{check_component, Component, Xid, XidError};
use regex::Regex;
use std::num::ParseIntError;
use thiserror::Error;
use tracing::debug;

/// Three underscore-separated fields, the first one decimal
static TID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)_([^_]*)_([^_]*)$").expect("transaction id pattern must compile")
});

/// Why a string could not be read as a structured transaction id
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    /// Not three underscore-separated fields with a decimal first field
    #[error("not a format_id_gtrid_bqual string")]
    NoMatch,

    /// format_id does not fit in an integer
    #[error("invalid format_id: {0}")]
    FormatId(#[from] ParseIntError),

    /// A component is not valid standard base64
    #[error("invalid base64 in {component}: {source}")]
    Base64 {
        /// Which component failed to decode
        component: Component,
        /// Decoder error
        source: base64::DecodeError,
    },

    /// The decoded triple breaks the XA component rules
    #[error(transparent)]
    Invalid(#[from] XidError),
}

/// Parse a structured transaction id
///
/// The format_id field is read as a decimal number, so leading zeros are
/// accepted: `"01_YWJj_eHl6"` parses to format_id 1.
pub fn parse_structured(tid: &str) -> Result<Xid, ParseError> {
    let caps = TID_PATTERN.captures(tid).ok_or(ParseError::NoMatch)?;

    let format_id: i64 = caps[1].parse()?;
    let gtrid = decode_component(Component::Gtrid, &caps[2])?;
    let bqual = decode_component(Component::Bqual, &caps[3])?;

    Ok(Xid::new(format_id, gtrid, bqual)?)
}

/// Decode a transaction id, never failing
///
/// Strings that are not structured transaction ids come back as
/// [`Xid::unparsed`] with the gtrid set to the whole input.
///
/// # Examples
///
/// ```
/// use pgxid_wire::decode_tid;
///
/// let xid = decode_tid("1_YWJj_eHl6");
/// assert_eq!(xid.triple(), Some((1, "abc", "xyz")));
///
/// let foreign = decode_tid("some_random_prepared_name");
/// assert!(foreign.is_unparsed());
/// assert_eq!(foreign.gtrid(), "some_random_prepared_name");
/// ```
pub fn decode_tid(tid: &str) -> Xid {
    match parse_structured(tid) {
        Ok(xid) => xid,
        Err(reason) => {
            debug!(tid, %reason, "treating transaction id as unparsed");
            Xid::unparsed(tid)
        }
    }
}

/// Base64-decode one component and check it before turning it into text
fn decode_component(component: Component, encoded: &str) -> Result<String, ParseError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|source| ParseError::Base64 { component, source })?;
    check_component(component, &bytes)?;
    // Printable ASCII only at this point, so bytes map 1:1 to chars
    Ok(bytes.into_iter().map(char::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Structured ===

    #[test]
    fn test_parse_structured() {
        let xid = parse_structured("1_YWJj_eHl6").unwrap();
        assert_eq!(xid.triple(), Some((1, "abc", "xyz")));
    }

    #[test]
    fn test_parse_empty_components() {
        let xid = parse_structured("0__").unwrap();
        assert_eq!(xid.triple(), Some((0, "", "")));
    }

    #[test]
    fn test_parse_padded_components() {
        let xid = parse_structured("42_YQ==_YWI=").unwrap();
        assert_eq!(xid.triple(), Some((42, "a", "ab")));
    }

    // === Rejections ===

    #[test]
    fn test_parse_no_match() {
        assert_eq!(
            parse_structured("some_random_prepared_name"),
            Err(ParseError::NoMatch)
        );
        assert_eq!(parse_structured("1_YWJj"), Err(ParseError::NoMatch));
        assert_eq!(parse_structured("1_a_b_c"), Err(ParseError::NoMatch));
        assert_eq!(parse_structured("-1_YWJj_eHl6"), Err(ParseError::NoMatch));
        assert_eq!(parse_structured(""), Err(ParseError::NoMatch));
    }

    #[test]
    fn test_parse_non_ascii_digits_do_not_match() {
        // Arabic-Indic digit one
        assert_eq!(parse_structured("\u{0661}_YWJj_eHl6"), Err(ParseError::NoMatch));
    }

    #[test]
    fn test_parse_bad_base64() {
        assert!(matches!(
            parse_structured("1_%%%_eHl6"),
            Err(ParseError::Base64 { component: Component::Gtrid, .. })
        ));
        assert!(matches!(
            parse_structured("1_YWJj_eHl"),
            Err(ParseError::Base64 { component: Component::Bqual, .. })
        ));
    }

    #[test]
    fn test_parse_format_id_out_of_range() {
        assert_eq!(
            parse_structured("2147483648_YWJj_eHl6"),
            Err(ParseError::Invalid(XidError::InvalidFormatId(2_147_483_648)))
        );
        assert!(matches!(
            parse_structured("99999999999999999999_YWJj_eHl6"),
            Err(ParseError::FormatId(_))
        ));
    }

    #[test]
    fn test_parse_decoded_component_rules() {
        // base64 of 65 'a' bytes
        let long = base64::engine::general_purpose::STANDARD.encode([b'a'; 65]);
        assert!(matches!(
            parse_structured(&format!("1_{}_", long)),
            Err(ParseError::Invalid(XidError::ComponentTooLong { len: 65, .. }))
        ));

        // base64 of [0x01]
        assert!(matches!(
            parse_structured("1_AQ==_"),
            Err(ParseError::Invalid(XidError::NonPrintableComponent { byte: 0x01, .. }))
        ));
    }

    #[test]
    fn test_parse_leading_zero_format_id() {
        let xid = parse_structured("01_YWJj_eHl6").unwrap();
        assert_eq!(xid.triple(), Some((1, "abc", "xyz")));

        let xid = decode_tid("007_YWJj_eHl6");
        assert_eq!(xid.format_id(), Some(7));
        assert!(!xid.is_unparsed());
    }

    // === Fallback ===

    #[test]
    fn test_decode_falls_back() {
        for raw in [
            "some_random_prepared_name",
            "1_%%%_eHl6",
            "2147483648_YWJj_eHl6",
            "",
            "plain",
        ] {
            let xid = decode_tid(raw);
            assert!(xid.is_unparsed(), "{raw:?} should be unparsed");
            assert_eq!(xid.gtrid(), raw);
            assert_eq!(xid.bqual(), None);
        }
    }

    #[test]
    fn test_decode_structured() {
        let xid = decode_tid("1_YWJj_eHl6");
        assert_eq!(xid, Xid::new(1, "abc", "xyz").unwrap());
    }
}
