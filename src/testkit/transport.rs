//! Mock [`HttpTransport`] returning canned responses.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Result, TransportError};
use crate::port::{HttpRequest, HttpResponse, HttpTransport};

/// Pops one scripted response per request and records every request.
///
/// When the script runs out, requests fail with [`TransportError::Closed`].
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse>>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with this body.
    #[must_use]
    pub fn with_ok(self, body: impl Into<String>) -> Self {
        self.push(Ok(HttpResponse::ok(body)));
        self
    }

    #[must_use]
    pub fn with_response(self, response: Result<HttpResponse>) -> Self {
        self.push(response);
        self
    }

    pub fn push(&self, response: Result<HttpResponse>) {
        self.responses.lock().push_back(response);
    }

    /// Every request executed so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request.
    ///
    /// # Panics
    ///
    /// Panics if nothing was executed.
    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .last()
            .cloned()
            .expect("no request executed")
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Closed.into()))
    }
}
