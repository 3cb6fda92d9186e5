//! Integration tests for Scholar Lens
//!
//! These tests drive the popup session end to end over saved Scholar pages,
//! first through the mock transport and then through reqwest against a local
//! mock server.

use scholar_lens::controller::{Popup, StaticPage};
use scholar_lens::fetch::{
    Endpoints, FetchKind, Fetcher, HttpTransport, MockTransport, DEFAULT_USER_AGENT,
};
use scholar_lens::parse::{parse_citation_html, parse_search_results};
use scholar_lens::render::{DialogEvent, MemoryClipboard, ResultsPane, COPIED_TEXT};
use std::sync::Arc;
use std::time::Instant;

const RESULTS_HTML: &str = include_str!("fixtures/results.html");
const CITATION_HTML: &str = include_str!("fixtures/citation.html");

const APA: &str = "Phupattanasilp, P., & Tong, S. R. (2019). Future Agriculture Farm Management using Augmented Reality. 2019 IEEE Workshop on Mixed and Augmented Reality, 1-4.";

fn mock_popup() -> (Popup, Arc<MockTransport>) {
    let mock = Arc::new(MockTransport::new());
    let fetcher = Fetcher::new(mock.clone(), Endpoints::default());
    (Popup::new(fetcher), mock)
}

#[test]
fn test_parse_results_fixture() {
    let results = parse_search_results(RESULTS_HTML);
    assert_eq!(results.len(), 3, "profile block should be skipped");

    let first = &results[0];
    assert_eq!(
        first.title.as_deref(),
        Some("Future Agriculture Farm Management using Augmented Reality")
    );
    assert_eq!(
        first.url.as_deref(),
        Some("https://ieeexplore.ieee.org/abstract/document/8940212/")
    );
    assert_eq!(
        first.authors.as_deref(),
        Some("P Phupattanasilp, SR Tong - 2019 IEEE Workshop on Mixed and Augmented Reality, 2019 - ieeexplore.ieee.org")
    );
    assert_eq!(first.cite_id(), Some("Xy12AbCdEfGJ"));
    assert_eq!(first.links.cited_by.as_ref().and_then(|l| l.count), Some(27));
    assert_eq!(first.links.versions.as_ref().and_then(|l| l.count), Some(3));

    let second = &results[1];
    assert_eq!(second.title.as_deref(), Some("Precision farming handbook"));
    assert_eq!(
        second.url.as_deref(),
        Some("https://scholar.google.com/scholar_url?url=https://books.example.org/precision-farming")
    );
    assert_eq!(second.cite_id(), Some("PfHb9876ZyXw"));
    assert_eq!(second.links.cited_by.as_ref().and_then(|l| l.count), None);
    assert!(second.snippet.is_none());

    let third = &results[2];
    assert!(third.title.is_none());
    assert_eq!(third.authors.as_deref(), Some("A Smith - 2018"));
    assert!(third.links.is_empty());
}

#[test]
fn test_parse_citation_fixture() {
    let data = parse_citation_html(CITATION_HTML);

    let styles: Vec<&str> = data.citations.iter().map(|c| c.style.as_str()).collect();
    assert_eq!(styles, ["MLA", "APA", "Chicago", "Harvard", "Vancouver"]);

    let apa = data.style("apa").unwrap();
    assert!(apa
        .text
        .contains("Future Agriculture Farm Management using Augmented Reality"));
    assert_eq!(apa.text, APA);

    let formats: Vec<&str> = data.exports.iter().map(|e| e.format.as_str()).collect();
    assert_eq!(formats, ["BibTeX", "EndNote", "RefMan", "RefWorks"]);
    assert!(data
        .export("BibTeX")
        .unwrap()
        .url
        .starts_with("https://scholar.googleusercontent.com/scholar.bib?q=info:Xy12AbCdEfGJ"));
    assert!(data.export("BibTeX").unwrap().url.contains("&output=citation&"));
}

#[tokio::test]
async fn test_popup_session_with_mock_transport() {
    let (mut popup, mock) = mock_popup();
    let endpoints = Endpoints::default();
    let title = "Future Agriculture Farm Management";

    mock.respond_ok(&endpoints.search_url(title), RESULTS_HTML);
    mock.respond_ok(&endpoints.citation_url("Xy12AbCdEfGJ"), CITATION_HTML);

    popup.activate(&StaticPage::new(title)).await;
    let views = popup.pane().results();
    assert_eq!(views.len(), 3);
    assert_eq!(
        views[0].link_row().as_deref(),
        Some("Cite · Cited by 27 · Related articles · All 3 versions")
    );
    assert_eq!(views[1].link_row().as_deref(), Some("Cite · Cited by"));
    assert!(views[2].link_row().is_none());

    assert!(popup.cite(0).await);
    let dialog = popup.dialog().current().unwrap();
    assert_eq!(dialog.rows.len(), 5);
    assert_eq!(
        dialog.exports[2].url,
        "https://scholar.google.com/scholar.ris?q=info:Xy12AbCdEfGJ:scholar.google.com/&output=citation&hl=en"
    );

    let clipboard = MemoryClipboard::new();
    let now = Instant::now();
    popup.copy_citation(1, &clipboard, now).unwrap();
    assert_eq!(clipboard.last().as_deref(), Some(APA));
    assert_eq!(
        popup.dialog().current().unwrap().rows[1].display_text(now),
        COPIED_TEXT
    );

    // Clicking inside keeps the dialog; the close control removes it
    assert!(!popup.close_dialog(DialogEvent::ClickInside));
    assert!(popup.close_dialog(DialogEvent::CloseButton));
    assert!(!popup.dialog().is_open());

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests
        .iter()
        .all(|r| r.header_value("User-Agent") == Some(DEFAULT_USER_AGENT)));
}

#[tokio::test]
async fn test_second_cite_replaces_dialog() {
    let (mut popup, mock) = mock_popup();
    let endpoints = Endpoints::default();

    mock.respond_ok(&endpoints.search_url("farm"), RESULTS_HTML);
    mock.respond_ok(&endpoints.citation_url("Xy12AbCdEfGJ"), CITATION_HTML);
    mock.respond_ok(
        &endpoints.citation_url("PfHb9876ZyXw"),
        "<div id=\"gs_citt\"><table></table></div>",
    );

    popup.submit("farm").await;
    assert!(popup.cite(0).await);
    assert!(popup.cite(1).await);

    let dialog = popup.dialog().current().unwrap();
    assert!(!dialog.has_citations());
    assert!(dialog.exports.is_empty());
}

#[tokio::test]
async fn test_popup_over_http() {
    let mut server = mockito::Server::new_async().await;
    let search = server
        .mock("GET", "/scholar")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("q".into(), "farm management".into()),
            mockito::Matcher::UrlEncoded("hl".into(), "en".into()),
        ]))
        .match_header("user-agent", DEFAULT_USER_AGENT)
        .with_status(200)
        .with_header("content-type", "text/html; charset=UTF-8")
        .with_body(RESULTS_HTML)
        .create_async()
        .await;
    let cite = server
        .mock("GET", "/scholar")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("output".into(), "cite".into()),
            mockito::Matcher::UrlEncoded("scirp".into(), "0".into()),
        ]))
        .with_status(200)
        .with_body(CITATION_HTML)
        .create_async()
        .await;

    let endpoints = Endpoints::new(server.url(), "en");
    let fetcher = Fetcher::new(Arc::new(HttpTransport::new().unwrap()), endpoints);
    let mut popup = Popup::new(fetcher);

    assert!(popup.submit("farm management").await);
    let views = popup.pane().results();
    assert_eq!(views.len(), 3);
    assert_eq!(
        views[1].url.as_deref(),
        Some(
            format!(
                "{}/scholar_url?url=https://books.example.org/precision-farming",
                server.url()
            )
            .as_str()
        )
    );

    assert!(popup.cite(0).await);
    assert_eq!(popup.citation().unwrap().citations.len(), 5);

    search.assert_async().await;
    cite.assert_async().await;
}

#[tokio::test]
async fn test_http_error_shows_fallback() {
    let mut server = mockito::Server::new_async().await;
    let blocked = server
        .mock("GET", "/scholar")
        .match_query(mockito::Matcher::Any)
        .with_status(503)
        .with_body(format!("  <html>{}</html>", "unusual traffic ".repeat(40)))
        .create_async()
        .await;

    let endpoints = Endpoints::new(format!("{}/", server.url()), "en");
    let fetcher = Fetcher::new(Arc::new(HttpTransport::new().unwrap()), endpoints);
    let mut popup = Popup::new(fetcher);

    popup.submit("farm robots").await;

    match popup.pane() {
        ResultsPane::Failed {
            message,
            fallback_url,
        } => {
            assert!(message.starts_with("Scholar request failed: 503 Service Unavailable - <html>unusual traffic"));
            let body_prefix = message.split(" - ").nth(1).unwrap();
            assert_eq!(body_prefix.chars().count(), 200);
            assert_eq!(
                fallback_url,
                &format!("{}/scholar?q=farm%20robots", server.url())
            );
        }
        other => panic!("Expected failure pane, got {:?}", other),
    }
    blocked.assert_async().await;
}

#[tokio::test]
async fn test_fetcher_rejects_relative_citation_target() {
    let (popup, mock) = mock_popup();
    let result = popup
        .fetcher()
        .fetch(FetchKind::Citation, "/scholar?q=info:abc")
        .await;

    assert!(result.is_err());
    assert!(mock.requests().is_empty());
}
