//! Citation dialog data: formatted citations and export links.

use serde::{Deserialize, Serialize};

/// One formatted citation (MLA, APA, Chicago, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Style label as shown by the provider
    pub style: String,

    /// Citation text with markup stripped
    pub text: String,
}

impl Citation {
    pub fn new(style: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            text: text.into(),
        }
    }
}

/// A downloadable citation format (BibTeX, EndNote, RefMan, RefWorks)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportLink {
    pub format: String,

    /// Literal `href` of the export anchor
    pub url: String,
}

impl ExportLink {
    pub fn new(format: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            url: url.into(),
        }
    }
}

/// Everything extracted from a citation dialog page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationData {
    #[serde(default)]
    pub citations: Vec<Citation>,

    #[serde(default)]
    pub exports: Vec<ExportLink>,
}

impl CitationData {
    /// Find a citation by style label (case-insensitive)
    pub fn style(&self, style: &str) -> Option<&Citation> {
        self.citations
            .iter()
            .find(|c| c.style.eq_ignore_ascii_case(style))
    }

    /// Find an export link by format label (case-insensitive)
    pub fn export(&self, format: &str) -> Option<&ExportLink> {
        self.exports
            .iter()
            .find(|e| e.format.eq_ignore_ascii_case(format))
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty() && self.exports.is_empty()
    }
}
