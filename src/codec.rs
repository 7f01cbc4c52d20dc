//! Canonical request parameter encoding.
//!
//! Every exchange re-derives the signed payload on its side, so the bytes we
//! sign and the bytes we send must come from the same functions here. Keys
//! are ordered by raw byte value (never locale collation) and values are
//! percent-escaped per RFC 3986: unreserved characters (`A-Z a-z 0-9 - _ . ~`)
//! pass through, everything else becomes `%XX` with uppercase hex.

use std::borrow::Cow;

use crate::error::{Error, Result};

/// An ordered parameter sequence.
pub type Params = Vec<(String, String)>;

/// Sort parameters by key, byte-wise ascending.
///
/// The sort is stable, so canonicalizing an already canonical sequence
/// returns it unchanged.
pub fn canonicalize<I, K, V>(params: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut pairs: Params = params
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();
    pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    pairs
}

/// Percent-escape a single value.
#[must_use]
pub fn escape(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Reverse of [`escape`].
///
/// # Errors
///
/// Returns a decode error if the escaped bytes are not valid UTF-8.
pub fn unescape(value: &str) -> Result<String> {
    urlencoding::decode(value)
        .map(Cow::into_owned)
        .map_err(|e| Error::decode("query component", e))
}

/// Join parameters as `k=v&k=v`, escaping values. Order is preserved; pass
/// the output of [`canonicalize`] when the exchange signs the query.
#[must_use]
pub fn to_query_string(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, escape(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse `k=v&k=v` back into pairs, unescaping values.
///
/// # Errors
///
/// Returns a decode error for invalid escapes.
pub fn parse_query_string(query: &str) -> Result<Params> {
    if query.is_empty() {
        return Ok(Vec::new());
    }
    query
        .split('&')
        .map(|part| -> Result<(String, String)> {
            let (k, v) = part.split_once('=').unwrap_or((part, ""));
            Ok((k.to_string(), unescape(v)?))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_orders_keys_bytewise() {
        let params = canonicalize([
            ("symbol", "btcusdt"),
            ("AccessKeyId", "k"),
            ("Timestamp", "t"),
            ("account-id", "1"),
            ("SignatureMethod", "HmacSHA256"),
        ]);
        let keys: Vec<_> = params.iter().map(|(k, _)| k.as_str()).collect();
        // Uppercase sorts before lowercase in ASCII.
        assert_eq!(
            keys,
            vec!["AccessKeyId", "SignatureMethod", "Timestamp", "account-id", "symbol"]
        );
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize([("b", "2"), ("a", "1"), ("_x", "3"), ("Z", "4")]);
        let twice = canonicalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn query_string_has_no_trailing_separator() {
        let params = canonicalize([("a", "1"), ("b", "2")]);
        assert_eq!(to_query_string(&params), "a=1&b=2");
        assert_eq!(to_query_string(&[]), "");
    }

    #[test]
    fn escape_uses_uppercase_hex_and_keeps_unreserved() {
        assert_eq!(escape("2018-01-01T00:00:00"), "2018-01-01T00%3A00%3A00");
        assert_eq!(escape("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(escape("a b"), "a%20b");
        assert_eq!(escape("/"), "%2F");
    }

    #[test]
    fn reserved_and_non_ascii_values_round_trip() {
        let original = canonicalize([
            ("note", "a&b=c"),
            ("name", "比特币 ünïcode"),
            ("plain", "btcusdt"),
        ]);
        let query = to_query_string(&original);
        assert!(!query.contains("a&b"));
        let parsed = parse_query_string(&query).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn unescape_rejects_invalid_utf8() {
        assert!(unescape("%FF%FE").is_err());
    }
}
