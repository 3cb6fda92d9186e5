//! Core data models for search results and citation data.

mod citation;
mod result;

pub use citation::{Citation, CitationData, ExportLink};
pub use result::{CountedLink, LinkKind, LinkRef, ResultLinks, SearchResult};
