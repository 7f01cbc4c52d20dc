//! reqwest-backed [`HttpTransport`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::Result;
use crate::port::{HttpRequest, HttpResponse, HttpTransport};
use crate::signing::HttpMethod;

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpSettings {
    /// Whole-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_timeout_ms() -> u64 {
    10_000
}

const fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_user_agent() -> String {
    concat!("coinbridge/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Executes requests with a shared reqwest client. Never retries.
#[derive(Clone)]
pub struct ReqwestTransport {
    http: HttpClient,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns a transport error if the TLS backend cannot be initialized.
    pub fn new(settings: &HttpSettings) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_millis(settings.timeout_ms))
            .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
            .user_agent(settings.user_agent.as_str())
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        // Signed query strings are not secret but are long; log the path only.
        let path = url.split('?').next().unwrap_or_default();
        debug!(method = %method, path, "Sending HTTP request");

        let mut builder = match method {
            HttpMethod::Get => self.http.get(&url),
            HttpMethod::Post => self.http.post(&url),
        };
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        trace!(status, bytes = body.len(), "Received HTTP response");
        Ok(HttpResponse::new(status, body))
    }
}
