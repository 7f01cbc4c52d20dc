//! Transport capabilities the core calls into.
//!
//! The core never opens sockets itself. Production implementations live in
//! `adapter::outbound::{http, websocket}`; tests script them.

use async_trait::async_trait;

use crate::error::Result;
use crate::signing::HttpMethod;

/// An outbound HTTP request, fully signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(body.into()),
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header with this name, case-insensitive.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw HTTP response: status plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One-shot HTTP capability.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Perform the request. Non-2xx statuses are returned, not raised; the
    /// caller decides whether the body carries an exchange error.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// A message on a duplex stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
}

/// A connected duplex stream.
///
/// `recv` must be cancel-safe: the dispatcher polls it alongside its outbound
/// queue and may drop a pending `recv` future.
#[async_trait]
pub trait DuplexStream: Send {
    async fn send(&mut self, frame: Frame) -> Result<()>;

    /// Next inbound frame; `None` once the stream is closed.
    async fn recv(&mut self) -> Option<Result<Frame>>;

    async fn close(&mut self) -> Result<()>;
}

/// Opens duplex streams.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn DuplexStream>>;
}
