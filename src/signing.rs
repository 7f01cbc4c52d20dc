//! Exchange request signing.
//!
//! Each scheme is two steps: build the canonical string the exchange will
//! re-derive, then MAC and encode it. [`canonical_payload`] and [`sign`] are
//! pure functions of the [`SigningContext`]; nothing here reads the clock or
//! holds state.
//!
//! | Scheme | Payload | MAC | Encoding |
//! |---|---|---|---|
//! | [`SignatureScheme::KeyedBody`] | raw body | HMAC-MD5 | lowercase hex |
//! | [`SignatureScheme::TimestampPath`] | base64(`METHOD HOST PATH[?query] millis [body]`) | HMAC-SHA1 | base64 |
//! | [`SignatureScheme::SortedQuery`] | `METHOD\nHOST\nPATH\nquery` | HMAC-SHA256 | base64 |

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::Sha256;

use crate::error::SigningError;

type HmacMd5 = Hmac<Md5>;
type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// HTTP method of a signed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// API secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Access key plus secret for one exchange account.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret: Secret,
}

impl Credentials {
    pub fn new(access_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret: Secret::new(secret),
        }
    }
}

/// Canonicalization-then-MAC pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    /// Bibox / CoinPark.
    KeyedBody,
    /// FCoin.
    TimestampPath,
    /// Huobi.
    SortedQuery,
}

/// Everything a scheme may sign. Built per request and dropped with it.
///
/// `query` and `body` must already be canonical: produced by
/// [`crate::codec::to_query_string`] over [`crate::codec::canonicalize`] for
/// the query-style schemes, or the exact body bytes for
/// [`SignatureScheme::KeyedBody`].
#[derive(Debug, Clone, Copy)]
pub struct SigningContext<'a> {
    pub method: HttpMethod,
    pub host: &'a str,
    pub path: &'a str,
    pub query: &'a str,
    pub body: &'a str,
    pub timestamp_ms: i64,
    pub secret: &'a Secret,
}

/// Build the exact string a scheme MACs.
#[must_use]
pub fn canonical_payload(ctx: &SigningContext<'_>, scheme: SignatureScheme) -> String {
    match scheme {
        SignatureScheme::KeyedBody => ctx.body.to_string(),
        SignatureScheme::TimestampPath => {
            let mut payload = String::with_capacity(
                ctx.host.len() + ctx.path.len() + ctx.query.len() + ctx.body.len() + 24,
            );
            payload.push_str(ctx.method.as_str());
            payload.push_str(ctx.host);
            payload.push_str(ctx.path);
            if !ctx.query.is_empty() {
                payload.push('?');
                payload.push_str(ctx.query);
            }
            payload.push_str(&ctx.timestamp_ms.to_string());
            payload.push_str(ctx.body);
            BASE64.encode(payload)
        }
        SignatureScheme::SortedQuery => format!(
            "{}\n{}\n{}\n{}",
            ctx.method.as_str(),
            ctx.host,
            ctx.path,
            ctx.query
        ),
    }
}

/// Sign a request.
///
/// # Errors
///
/// Fails only when the secret is empty.
pub fn sign(ctx: &SigningContext<'_>, scheme: SignatureScheme) -> Result<String, SigningError> {
    if ctx.secret.is_empty() {
        return Err(SigningError::EmptySecret);
    }
    let payload = canonical_payload(ctx, scheme);
    let key = ctx.secret.expose();
    match scheme {
        SignatureScheme::KeyedBody => Ok(hex::encode(mac::<HmacMd5>(key, &payload)?)),
        SignatureScheme::TimestampPath => Ok(BASE64.encode(mac::<HmacSha1>(key, &payload)?)),
        SignatureScheme::SortedQuery => Ok(BASE64.encode(mac::<HmacSha256>(key, &payload)?)),
    }
}

fn mac<M: Mac + hmac::digest::KeyInit>(key: &[u8], payload: &str) -> Result<Vec<u8>, SigningError> {
    let mut mac = <M as Mac>::new_from_slice(key)
        .map_err(|e| SigningError::InvalidKey(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}
