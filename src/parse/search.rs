//! Result-page parsing.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{element_text, extract_number};
use crate::fetch::DEFAULT_BASE_URL;
use crate::models::{CountedLink, LinkRef, ResultLinks, SearchResult};

/// Class marking a profile ("User profiles for ...") block
const PROFILE_CLASS: &str = "gs_or_svg";

struct ResultSelectors {
    container: Selector,
    title: Selector,
    authors: Selector,
    snippet: Selector,
    cite_button: Selector,
    cite_holder: Selector,
    cited_by: Selector,
    related: Selector,
    versions: Selector,
}

impl ResultSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            container: Selector::parse(".gs_r").ok()?,
            title: Selector::parse(".gs_rt a").ok()?,
            authors: Selector::parse(".gs_a").ok()?,
            snippet: Selector::parse(".gs_rs").ok()?,
            cite_button: Selector::parse(".gs_or_cit").ok()?,
            cite_holder: Selector::parse(r#"[id^="gs_cit"]"#).ok()?,
            cited_by: Selector::parse(r#"a[href*="cites="]"#).ok()?,
            related: Selector::parse(r#"a[href*="q=related:"]"#).ok()?,
            versions: Selector::parse(r#"a[href*="cluster="]"#).ok()?,
        })
    }
}

/// Parse a Scholar results page, resolving relative links against the
/// public Scholar host.
pub fn parse_search_results(html: &str) -> Vec<SearchResult> {
    parse_search_results_with_base(html, DEFAULT_BASE_URL)
}

/// Parse a Scholar results page, resolving relative links against `base_url`.
pub fn parse_search_results_with_base(html: &str, base_url: &str) -> Vec<SearchResult> {
    let Some(selectors) = ResultSelectors::new() else {
        tracing::error!("Failed to build result selectors");
        return Vec::new();
    };
    let base = Url::parse(base_url).ok();
    let document = Html::parse_document(html);

    let mut results = Vec::new();
    let mut skipped = 0usize;

    for container in document.select(&selectors.container) {
        if container.value().classes().any(|c| c == PROFILE_CLASS) {
            skipped += 1;
            continue;
        }
        results.push(parse_container(&container, &selectors, base.as_ref()));
    }

    tracing::debug!(
        "Parsed {} results ({} profile blocks skipped)",
        results.len(),
        skipped
    );
    results
}

fn parse_container(
    container: &ElementRef,
    selectors: &ResultSelectors,
    base: Option<&Url>,
) -> SearchResult {
    let mut result = SearchResult::default();

    if let Some(title) = container.select(&selectors.title).next() {
        result.title = element_text(&title);
        result.url = title.value().attr("href").map(|href| resolve(base, href));
    }

    result.authors = container
        .select(&selectors.authors)
        .next()
        .and_then(|e| element_text(&e));

    result.snippet = container
        .select(&selectors.snippet)
        .next()
        .and_then(|e| element_text(&e));

    result.links = parse_links(container, selectors, base);
    result
}

fn parse_links(
    container: &ElementRef,
    selectors: &ResultSelectors,
    base: Option<&Url>,
) -> ResultLinks {
    let mut links = ResultLinks::default();

    if container.select(&selectors.cite_button).next().is_some() {
        links.cite_data_id = non_empty_cid(container.value().attr("data-cid"))
            .or_else(|| {
                container
                    .select(&selectors.cite_holder)
                    .next()
                    .and_then(|e| non_empty_cid(e.value().attr("data-cid")))
            })
            .map(str::to_string);
    }

    links.cited_by = container
        .select(&selectors.cited_by)
        .next()
        .and_then(|a| counted_link(&a, base));

    links.related = container
        .select(&selectors.related)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| LinkRef::new(resolve(base, href)));

    links.versions = container
        .select(&selectors.versions)
        .next()
        .and_then(|a| counted_link(&a, base));

    links
}

/// A `data-cid` value, or `None` when absent or blank
fn non_empty_cid(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|id| !id.is_empty())
}

fn counted_link(anchor: &ElementRef, base: Option<&Url>) -> Option<CountedLink> {
    let href = anchor.value().attr("href")?;
    let count = extract_number(&anchor.text().collect::<String>());
    Some(CountedLink::new(resolve(base, href), count))
}

/// Resolve `href` against `base`; absolute hrefs pass through.
fn resolve(base: Option<&Url>, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    base.and_then(|b| b.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_else(|| href.to_string())
}
