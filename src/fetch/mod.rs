//! Fetching Scholar pages over an injectable transport.
//!
//! [`Fetcher`] owns the URL templates and the fixed browser `User-Agent` and
//! delegates the actual GET to a [`Transport`]. Production code uses
//! [`HttpTransport`] (reqwest); tests substitute [`MockTransport`].
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scholar_lens::fetch::{Endpoints, FetchKind, Fetcher, HttpTransport};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = Fetcher::new(Arc::new(HttpTransport::new()?), Endpoints::default());
//! let html = fetcher.fetch(FetchKind::Search, "augmented reality farming").await?;
//! # Ok(())
//! # }
//! ```
//!
//! Requests are not retried or rate limited; a failure is reported once and
//! the caller decides how to present it.

mod http;
mod message;
pub mod mock;

pub use http::HttpTransport;
pub use message::{FetchReply, FetchRequest};
pub use mock::MockTransport;

use async_trait::async_trait;
use std::sync::Arc;

/// Public Scholar host
pub const DEFAULT_BASE_URL: &str = "https://scholar.google.com";

/// Interface language requested from Scholar
pub const DEFAULT_LANGUAGE: &str = "en";

/// Desktop Safari user agent; Scholar serves different markup to other clients
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Safari/605.1.15";

/// Maximum number of characters of an error body kept in [`FetchError::HttpStatus`]
pub const BODY_PREFIX_LEN: usize = 200;

/// What is being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// A results page; the target is a free-text query
    Search,
    /// A citation dialog; the target is an absolute URL
    Citation,
}

impl FetchKind {
    fn label(&self) -> &'static str {
        match self {
            FetchKind::Search => "Scholar",
            FetchKind::Citation => "Citation",
        }
    }
}

impl std::fmt::Display for FetchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchKind::Search => write!(f, "search"),
            FetchKind::Citation => write!(f, "citation"),
        }
    }
}

/// Errors surfaced by the fetcher
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, connect, TLS, timeout)
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx status
    #[error("{} request failed: {status} {status_text} - {body_prefix}", .kind.label())]
    HttpStatus {
        kind: FetchKind,
        status: u16,
        status_text: String,
        body_prefix: String,
    },

    /// A failure reported through a [`FetchReply`]
    #[error("{0}")]
    Remote(String),

    /// The target could not be turned into a request URL
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}

/// An outgoing GET request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl TransportRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Value of the first header named `name` (case-insensitive)
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response as seen by the fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The HTTP capability the fetcher depends on
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Perform a GET. Non-2xx statuses are returned as responses, not errors.
    async fn get(&self, request: TransportRequest) -> Result<RawResponse, FetchError>;
}

/// Scholar URL templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base_url: String,
    pub language: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, DEFAULT_LANGUAGE)
    }
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            language: language.into(),
        }
    }

    /// Results page for `query`
    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/scholar?q={}&hl={}",
            self.base_url,
            urlencoding::encode(query),
            self.language
        )
    }

    /// Citation dialog for a result's citation identifier
    pub fn citation_url(&self, cite_id: &str) -> String {
        format!(
            "{}/scholar?q=info:{}:scholar.google.com/&output=cite&scirp=0&hl={}",
            self.base_url, cite_id, self.language
        )
    }

    /// Link for running the same search on the provider's own site
    pub fn fallback_url(&self, query: &str) -> String {
        format!(
            "{}/scholar?q={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

/// Issues search and citation requests
#[derive(Debug, Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    endpoints: Endpoints,
    user_agent: String,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn Transport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Override the browser user agent sent with every request
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Fetch a page and return its HTML.
    ///
    /// For [`FetchKind::Search`] `target` is the query text; for
    /// [`FetchKind::Citation`] it must be an absolute URL.
    pub async fn fetch(&self, kind: FetchKind, target: &str) -> Result<String, FetchError> {
        let url = match kind {
            FetchKind::Search => self.endpoints.search_url(target),
            FetchKind::Citation => {
                url::Url::parse(target)
                    .map_err(|e| FetchError::InvalidTarget(format!("{}: {}", target, e)))?;
                target.to_string()
            }
        };

        tracing::debug!("Fetching {} page: {}", kind, url);

        let request = TransportRequest::new(url).header("User-Agent", self.user_agent.as_str());
        let response = self.transport.get(request).await.map_err(|e| {
            tracing::warn!("{} request failed: {}", kind, e);
            e
        })?;

        if !response.is_success() {
            tracing::warn!(
                "{} request returned status {} {}",
                kind,
                response.status,
                response.status_text
            );
            return Err(FetchError::HttpStatus {
                kind,
                status: response.status,
                status_text: response.status_text,
                body_prefix: body_prefix(&response.body),
            });
        }

        tracing::debug!("Received {} bytes", response.body.len());
        Ok(response.body)
    }

    /// Answer a [`FetchRequest`] message, folding failures into the reply
    pub async fn handle(&self, request: FetchRequest) -> FetchReply {
        let (kind, target) = request.target();
        match self.fetch(kind, target).await {
            Ok(html) => FetchReply::ok(html),
            Err(e) => FetchReply::err(e.to_string()),
        }
    }
}

/// Trimmed body cut to [`BODY_PREFIX_LEN`] characters
fn body_prefix(body: &str) -> String {
    body.trim().chars().take(BODY_PREFIX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(mock: &Arc<MockTransport>) -> Fetcher {
        Fetcher::new(mock.clone(), Endpoints::default())
    }

    #[test]
    fn test_endpoint_templates() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.search_url("deep learning & farms"),
            "https://scholar.google.com/scholar?q=deep%20learning%20%26%20farms&hl=en"
        );
        assert_eq!(
            endpoints.citation_url("Xy12"),
            "https://scholar.google.com/scholar?q=info:Xy12:scholar.google.com/&output=cite&scirp=0&hl=en"
        );
        assert_eq!(
            endpoints.fallback_url("a b"),
            "https://scholar.google.com/scholar?q=a%20b"
        );
    }

    #[test]
    fn test_endpoints_trim_trailing_slash() {
        let endpoints = Endpoints::new("https://scholar.example.com/", "de");
        assert_eq!(
            endpoints.search_url("x"),
            "https://scholar.example.com/scholar?q=x&hl=de"
        );
    }

    #[tokio::test]
    async fn test_search_sends_user_agent() {
        let mock = Arc::new(MockTransport::new());
        let url = Endpoints::default().search_url("farm");
        mock.respond_ok(&url, "<html></html>");

        let html = fetcher(&mock).fetch(FetchKind::Search, "farm").await.unwrap();
        assert_eq!(html, "<html></html>");

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, url);
        assert_eq!(requests[0].header_value("user-agent"), Some(DEFAULT_USER_AGENT));
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let mock = Arc::new(MockTransport::new());
        let url = Endpoints::default().search_url("farm");
        let body = format!("  {}  ", "x".repeat(500));
        mock.respond(&url, 429, body);

        let err = fetcher(&mock)
            .fetch(FetchKind::Search, "farm")
            .await
            .unwrap_err();

        match &err {
            FetchError::HttpStatus {
                kind,
                status,
                status_text,
                body_prefix,
            } => {
                assert_eq!(*kind, FetchKind::Search);
                assert_eq!(*status, 429);
                assert_eq!(status_text, "Too Many Requests");
                assert_eq!(body_prefix.len(), BODY_PREFIX_LEN);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err
            .to_string()
            .starts_with("Scholar request failed: 429 Too Many Requests - xxx"));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let mock = Arc::new(MockTransport::new());
        let url = Endpoints::default().citation_url("abc");
        mock.fail(&url, "connection refused");

        let err = fetcher(&mock)
            .fetch(FetchKind::Citation, &url)
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Transport("connection refused".to_string()));
    }

    #[tokio::test]
    async fn test_citation_requires_absolute_url() {
        let mock = Arc::new(MockTransport::new());
        let err = fetcher(&mock)
            .fetch(FetchKind::Citation, "/scholar?output=cite")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidTarget(_)));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_custom_user_agent() {
        let mock = Arc::new(MockTransport::new());
        mock.respond_any(200, "ok");

        let fetcher = fetcher(&mock).with_user_agent("TestAgent/1.0");
        fetcher.fetch(FetchKind::Search, "q").await.unwrap();
        assert_eq!(
            mock.requests()[0].header_value("User-Agent"),
            Some("TestAgent/1.0")
        );
    }

    #[tokio::test]
    async fn test_handle_folds_errors_into_reply() {
        let mock = Arc::new(MockTransport::new());
        let fetcher = fetcher(&mock);
        mock.respond_ok(&Endpoints::default().search_url("ok"), "<p>hi</p>");
        mock.respond(&Endpoints::default().search_url("bad"), 503, "down");

        let reply = fetcher.handle(FetchRequest::search("ok")).await;
        assert_eq!(reply, FetchReply::ok("<p>hi</p>"));

        let reply = fetcher.handle(FetchRequest::search("bad")).await;
        assert!(!reply.success);
        assert_eq!(
            reply.error.as_deref(),
            Some("Scholar request failed: 503 Service Unavailable - down")
        );
    }
}
