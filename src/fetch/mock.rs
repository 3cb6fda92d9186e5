//! Mock transport for testing purposes.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{FetchError, RawResponse, Transport, TransportRequest};

type Reply = Result<RawResponse, FetchError>;

/// A transport that replays canned responses and records every request.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, Reply>>,
    fallback: Mutex<Option<Reply>>,
    requests: Mutex<Vec<TransportRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn response(status: u16, body: impl Into<String>) -> RawResponse {
    let status_text = ::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or_default()
        .to_string();

    RawResponse {
        status,
        status_text,
        body: body.into(),
    }
}

impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer GETs to `url` with `status` and `body`.
    pub fn respond(&self, url: &str, status: u16, body: impl Into<String>) {
        lock(&self.responses).insert(url.to_string(), Ok(response(status, body)));
    }

    /// Answer GETs to `url` with 200 OK.
    pub fn respond_ok(&self, url: &str, body: impl Into<String>) {
        self.respond(url, 200, body);
    }

    /// Fail GETs to `url` with a transport error.
    pub fn fail(&self, url: &str, message: impl Into<String>) {
        lock(&self.responses).insert(url.to_string(), Err(FetchError::Transport(message.into())));
    }

    /// Answer any URL without a specific response.
    pub fn respond_any(&self, status: u16, body: impl Into<String>) {
        *lock(&self.fallback) = Some(Ok(response(status, body)));
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<TransportRequest> {
        lock(&self.requests).clone()
    }

    /// Clear configured responses and recorded requests.
    pub fn reset(&self) {
        lock(&self.responses).clear();
        *lock(&self.fallback) = None;
        lock(&self.requests).clear();
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, request: TransportRequest) -> Result<RawResponse, FetchError> {
        let url = request.url.clone();
        lock(&self.requests).push(request);

        if let Some(reply) = lock(&self.responses).get(&url) {
            return reply.clone();
        }
        match &*lock(&self.fallback) {
            Some(reply) => reply.clone(),
            None => Err(FetchError::Transport(format!(
                "no mock response for {}",
                url
            ))),
        }
    }
}
