//! HTML parsing for Scholar result pages and citation dialogs.
//!
//! Both parsers are pure functions over an HTML string. Markup on the
//! provider side is an uncontrolled contract, so every selector is
//! best-effort: a missing element produces an empty list or an absent field,
//! never an error.
//!
//! - [`parse_search_results`]: result containers to [`SearchResult`](crate::models::SearchResult)s
//! - [`parse_citation_html`]: citation table and export links to [`CitationData`](crate::models::CitationData)
//! - [`normalize_text`] / [`extract_number`]: text helpers shared by both

mod citation;
mod search;
mod text;

pub use citation::parse_citation_html;
pub use search::{parse_search_results, parse_search_results_with_base};
pub use text::{extract_number, normalize_text};

use scraper::ElementRef;

/// Normalized text content of an element, `None` when it is blank.
fn element_text(element: &ElementRef) -> Option<String> {
    let text = normalize_text(&element.text().collect::<String>());
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
