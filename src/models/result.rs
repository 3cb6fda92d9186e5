//! Search result model representing one hit on a Scholar results page.

use serde::{Deserialize, Serialize};

/// Which auxiliary link a counted label belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkKind {
    CitedBy,
    Related,
    Versions,
}

/// An outbound link without a count (e.g. "Related articles")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub url: String,
}

impl LinkRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// An outbound link carrying an optional number (e.g. "Cited by 42")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountedLink {
    pub url: String,

    /// Number found in the link text; `None` when the text had no digits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
}

impl CountedLink {
    pub fn new(url: impl Into<String>, count: Option<u32>) -> Self {
        Self {
            url: url.into(),
            count,
        }
    }

    /// Human-readable label for this link.
    ///
    /// A missing count yields the bare label ("Cited by", "All versions").
    pub fn label(&self, kind: LinkKind) -> String {
        match (kind, self.count) {
            (LinkKind::CitedBy, Some(n)) => format!("Cited by {}", n),
            (LinkKind::CitedBy, None) => "Cited by".to_string(),
            (LinkKind::Versions, Some(n)) => format!("All {} versions", n),
            (LinkKind::Versions, None) => "All versions".to_string(),
            (LinkKind::Related, _) => "Related articles".to_string(),
        }
    }
}

/// Auxiliary links found under a result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultLinks {
    /// Opaque identifier used to look up the citation dialog
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cite_data_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cited_by: Option<CountedLink>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<LinkRef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<CountedLink>,
}

impl ResultLinks {
    /// True when the result had none of the auxiliary links
    pub fn is_empty(&self) -> bool {
        self.cite_data_id.is_none()
            && self.cited_by.is_none()
            && self.related.is_none()
            && self.versions.is_none()
    }
}

/// A single search hit
///
/// Every field is optional: absence means the results page omitted that
/// element for this hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Result title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Absolute URL of the title link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Author / venue / year line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,

    /// Abstract excerpt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,

    #[serde(default)]
    pub links: ResultLinks,
}

impl SearchResult {
    /// Citation identifier, if the result offered a "Cite" control
    pub fn cite_id(&self) -> Option<&str> {
        self.links.cite_data_id.as_deref()
    }

    /// Title or a placeholder for untitled entries
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}
