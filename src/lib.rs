//! # Scholar Lens
//!
//! Look up the page you are reading on Google Scholar without leaving the
//! terminal: search by title, browse the hits, and copy a formatted citation.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`fetch`]: HTTP retrieval of search and citation pages behind a [`fetch::Transport`] seam
//! - [`parse`]: Pure HTML to [`models`] extraction
//! - [`render`]: Result and citation dialog views, clipboard, terminal drawing
//! - [`controller`]: The popup session tying the above together
//! - [`config`]: Configuration management
//! - [`ui`]: Terminal helpers

pub mod config;
pub mod controller;
pub mod fetch;
pub mod models;
pub mod parse;
pub mod render;
pub mod ui;

// Re-export commonly used types
pub use controller::{PageContext, Popup};
pub use fetch::{FetchError, Fetcher};
pub use models::{CitationData, SearchResult};
pub use parse::{parse_citation_html, parse_search_results};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
