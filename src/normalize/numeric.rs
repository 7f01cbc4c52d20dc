use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::error::{Error, Result};

/// Parse an optional numeric string. Missing or blank means `None`.
///
/// # Errors
///
/// Returns a decode error if the text is present but not a number.
pub fn optional_decimal(field: &'static str, raw: Option<&str>) -> Result<Option<Decimal>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse(field, text).map(Some),
    }
}

/// Parse a numeric string that must be present.
///
/// # Errors
///
/// Returns a decode error if the text is missing, blank or not a number.
pub fn required_decimal(field: &'static str, raw: Option<&str>) -> Result<Decimal> {
    optional_decimal(field, raw)?.ok_or_else(|| Error::decode(field, "missing"))
}

/// Decimal from a JSON number or numeric string.
///
/// Feeds mix both encodings; numbers go through their shortest text form so
/// `0.1` stays `0.1` rather than its binary approximation.
///
/// # Errors
///
/// Returns a decode error for any other JSON type or unparsable text.
pub fn decimal_from_json(field: &'static str, value: &Value) -> Result<Decimal> {
    match value {
        Value::Number(n) => parse(field, &n.to_string()),
        Value::String(s) => parse(field, s.trim()),
        other => Err(Error::decode(field, format!("expected number, got {other}"))),
    }
}

fn parse(field: &'static str, text: &str) -> Result<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|e| Error::decode(field, format!("'{text}': {e}")))
}

/// Unix milliseconds to a UTC timestamp; zero or out of range means unknown.
#[must_use]
pub fn millis_to_datetime(ms: i64) -> Option<DateTime<Utc>> {
    if ms <= 0 {
        return None;
    }
    Utc.timestamp_millis_opt(ms).single()
}

/// Unix seconds to a UTC timestamp; zero or out of range means unknown.
#[must_use]
pub fn seconds_to_datetime(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        return None;
    }
    Utc.timestamp_opt(secs, 0).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn blank_and_missing_are_none() {
        assert_eq!(optional_decimal("price", None).unwrap(), None);
        assert_eq!(optional_decimal("price", Some("")).unwrap(), None);
        assert_eq!(optional_decimal("price", Some("  ")).unwrap(), None);
    }

    #[test]
    fn long_exchange_decimals_parse_exactly() {
        assert_eq!(
            required_decimal("amount", Some("0.100000000000000000")).unwrap(),
            dec!(0.1)
        );
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            required_decimal("amount", Some("abc")),
            Err(Error::Decode { context: "amount", .. })
        ));
        assert!(required_decimal("amount", None).is_err());
    }

    #[test]
    fn json_numbers_keep_their_text_form() {
        assert_eq!(decimal_from_json("p", &json!(0.1)).unwrap(), dec!(0.1));
        assert_eq!(decimal_from_json("p", &json!("6500.5")).unwrap(), dec!(6500.5));
        assert_eq!(decimal_from_json("p", &json!(1e-7)).unwrap(), dec!(0.0000001));
        assert!(decimal_from_json("p", &json!(null)).is_err());
    }

    #[test]
    fn zero_timestamps_are_unknown() {
        assert!(millis_to_datetime(0).is_none());
        assert_eq!(
            millis_to_datetime(1_523_069_544_359).unwrap().timestamp(),
            1_523_069_544
        );
        assert_eq!(seconds_to_datetime(1_523_069_544).unwrap().timestamp(), 1_523_069_544);
    }
}
