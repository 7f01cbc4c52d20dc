//! Response helpers shared by the REST adapters.

use std::io::Read;

use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::OrderId;
use crate::error::{Error, Result, TransportError};
use crate::port::HttpResponse;

const MAX_ERROR_BODY: usize = 512;

/// Parse a response body as JSON.
///
/// A non-2xx response whose body is not JSON becomes
/// [`TransportError::Status`]; a 2xx one becomes a decode error. JSON bodies
/// are returned whatever the status, since exchanges put their error codes
/// there.
pub(crate) fn parse_json(response: &HttpResponse) -> Result<Value> {
    match serde_json::from_str(&response.body) {
        Ok(value) => Ok(value),
        Err(_) if !response.is_success() => Err(TransportError::Status {
            status: response.status,
            body: truncate(&response.body),
        }
        .into()),
        Err(e) => Err(Error::decode("response body", e)),
    }
}

/// Deserialize an exchange payload.
pub(crate) fn from_value<T: DeserializeOwned>(context: &'static str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::decode(context, e))
}

/// Map a native error code to [`Error::Auth`] or [`Error::Exchange`].
pub(crate) fn rejection(
    exchange: &'static str,
    auth_codes: &[&str],
    code: String,
    message: String,
) -> Error {
    if auth_codes.contains(&code.as_str()) {
        Error::Auth {
            exchange,
            code,
            message,
        }
    } else {
        Error::Exchange {
            exchange,
            code,
            message,
        }
    }
}

/// Text of a JSON scalar: strings as-is, numbers via their shortest form.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// The order id in an accepted placement's payload, string or number.
pub(crate) fn to_placement_result(context: &'static str, data: &Value) -> Result<OrderId> {
    scalar_text(data)
        .filter(|id| !id.is_empty())
        .map(OrderId::new)
        .ok_or_else(|| Error::decode(context, data.to_string()))
}

/// Inflate a gzip payload into UTF-8 text.
pub(crate) fn gunzip(bytes: &[u8]) -> Result<String> {
    let mut text = String::new();
    GzDecoder::new(bytes)
        .read_to_string(&mut text)
        .map_err(|e| Error::decode("gzip frame", e))?;
    Ok(text)
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn gzip(text: &str) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}
