//! Request/reply messages exchanged between the front end and the fetcher.
//!
//! The JSON shape is `{"action":"fetchScholar","query":"..."}` or
//! `{"action":"fetchCitations","url":"..."}` on the way in and
//! `{"success":true,"html":"..."}` / `{"success":false,"error":"..."}` on the
//! way out.

use serde::{Deserialize, Serialize};

use super::{FetchError, FetchKind};

/// A fetch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum FetchRequest {
    #[serde(rename = "fetchScholar")]
    Search { query: String },

    #[serde(rename = "fetchCitations")]
    Citation { url: String },
}

impl FetchRequest {
    pub fn search(query: impl Into<String>) -> Self {
        FetchRequest::Search {
            query: query.into(),
        }
    }

    pub fn citation(url: impl Into<String>) -> Self {
        FetchRequest::Citation { url: url.into() }
    }

    /// Kind and target to pass to [`Fetcher::fetch`](super::Fetcher::fetch)
    pub fn target(&self) -> (FetchKind, &str) {
        match self {
            FetchRequest::Search { query } => (FetchKind::Search, query),
            FetchRequest::Citation { url } => (FetchKind::Citation, url),
        }
    }
}

/// Outcome of a fetch request, failures included
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchReply {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchReply {
    pub fn ok(html: impl Into<String>) -> Self {
        Self {
            success: true,
            html: Some(html.into()),
            error: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            html: None,
            error: Some(error.into()),
        }
    }

    /// Convert back into a `Result`, treating a malformed reply as a failure
    pub fn into_result(self) -> Result<String, FetchError> {
        match (self.success, self.html, self.error) {
            (true, Some(html), _) => Ok(html),
            (_, _, Some(error)) => Err(FetchError::Remote(error)),
            _ => Err(FetchError::Remote("Malformed fetch reply".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let request = FetchRequest::search("augmented reality");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"action": "fetchScholar", "query": "augmented reality"})
        );

        let parsed: FetchRequest = serde_json::from_value(json!({
            "action": "fetchCitations",
            "url": "https://scholar.google.com/scholar?q=info:x"
        }))
        .unwrap();
        assert_eq!(
            parsed.target(),
            (FetchKind::Citation, "https://scholar.google.com/scholar?q=info:x")
        );
    }

    #[test]
    fn test_reply_wire_format() {
        assert_eq!(
            serde_json::to_value(FetchReply::ok("<p/>")).unwrap(),
            json!({"success": true, "html": "<p/>"})
        );
        assert_eq!(
            serde_json::to_value(FetchReply::err("boom")).unwrap(),
            json!({"success": false, "error": "boom"})
        );
    }

    #[test]
    fn test_into_result() {
        assert_eq!(FetchReply::ok("x").into_result(), Ok("x".to_string()));
        assert_eq!(
            FetchReply::err("boom").into_result(),
            Err(FetchError::Remote("boom".to_string()))
        );

        let malformed: FetchReply = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(malformed.into_result().is_err());
    }
}
