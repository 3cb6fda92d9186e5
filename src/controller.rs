//! The popup session: fetch, parse and render in response to user actions.
//!
//! [`Popup`] holds the search input, the results pane and the citation
//! dialog. Requests go out as [`FetchRequest`] messages and come back as
//! [`FetchReply`] values; a failed search becomes a displayable state with a
//! fallback link, and a failed citation lookup is only logged.
//!
//! Requests are awaited one at a time and never cancelled, so a caller that
//! runs searches concurrently gets whichever response lands last.

use std::time::{Duration, Instant};

use crate::fetch::{FetchReply, FetchRequest, Fetcher};
use crate::models::{CitationData, SearchResult};
use crate::parse::{parse_citation_html, parse_search_results_with_base};
use crate::render::{
    CitationDialog, Clipboard, ClipboardError, DialogEvent, DialogSlot, ResultView, ResultsPane,
    COPY_FEEDBACK,
};

/// Environment variable read by [`EnvPage`]
pub const PAGE_TITLE_VAR: &str = "SCHOLAR_LENS_PAGE_TITLE";

/// Errors reading the active page
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("No active page")]
    NoActivePage,

    #[error("Page title unavailable: {0}")]
    Unavailable(String),
}

/// Source of the title used to seed the first search
pub trait PageContext {
    fn active_title(&self) -> Result<String, PageError>;
}

/// A fixed page title (e.g. passed on the command line)
#[derive(Debug, Clone, Default)]
pub struct StaticPage(pub Option<String>);

impl StaticPage {
    pub fn new(title: impl Into<String>) -> Self {
        Self(Some(title.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl PageContext for StaticPage {
    fn active_title(&self) -> Result<String, PageError> {
        self.0.clone().ok_or(PageError::NoActivePage)
    }
}

/// Reads the title from [`PAGE_TITLE_VAR`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvPage;

impl PageContext for EnvPage {
    fn active_title(&self) -> Result<String, PageError> {
        std::env::var(PAGE_TITLE_VAR).map_err(|e| PageError::Unavailable(e.to_string()))
    }
}

/// State and behaviour of one popup session
#[derive(Debug)]
pub struct Popup {
    fetcher: Fetcher,
    input: String,
    results: Vec<SearchResult>,
    pane: ResultsPane,
    dialog: DialogSlot,
    citation: Option<CitationData>,
    copy_feedback: Duration,
}

impl Popup {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            input: String::new(),
            results: Vec::new(),
            pane: ResultsPane::Idle,
            dialog: DialogSlot::new(),
            citation: None,
            copy_feedback: COPY_FEEDBACK,
        }
    }

    pub fn with_copy_feedback(mut self, copy_feedback: Duration) -> Self {
        self.copy_feedback = copy_feedback;
        self
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Current contents of the search input
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Parsed results of the last successful search
    pub fn results(&self) -> &[SearchResult] {
        &self.results
    }

    pub fn pane(&self) -> &ResultsPane {
        &self.pane
    }

    pub fn dialog(&self) -> &DialogSlot {
        &self.dialog
    }

    /// Parsed data behind the open dialog
    pub fn citation(&self) -> Option<&CitationData> {
        if self.dialog.is_open() {
            self.citation.as_ref()
        } else {
            None
        }
    }

    /// Seed the input from the active page and search right away.
    ///
    /// A page that cannot be read leaves the input empty; it never stops the
    /// popup from opening.
    pub async fn activate(&mut self, page: &dyn PageContext) {
        match page.active_title() {
            Ok(title) => {
                let title = title.trim();
                if title.is_empty() {
                    tracing::debug!("Active page has no title");
                } else {
                    self.input = title.to_string();
                }
            }
            Err(e) => tracing::warn!("Could not read the active page title: {}", e),
        }

        if !self.input.is_empty() {
            let query = self.input.clone();
            self.search(&query).await;
        }
    }

    /// Handle the search button or Enter. Blank input does nothing.
    pub async fn submit(&mut self, input: &str) -> bool {
        let query = input.trim();
        if query.is_empty() {
            return false;
        }
        self.input = query.to_string();
        self.search(query).await;
        true
    }

    /// Run a search and replace the results pane with the outcome
    pub async fn search(&mut self, query: &str) {
        self.pane = ResultsPane::Loading {
            query: query.to_string(),
        };

        let reply = self.fetcher.handle(FetchRequest::search(query)).await;
        let endpoints = self.fetcher.endpoints().clone();

        match reply.into_result() {
            Ok(html) => {
                self.results = parse_search_results_with_base(&html, &endpoints.base_url);
                tracing::debug!("Found {} results for {:?}", self.results.len(), query);

                self.pane = if self.results.is_empty() {
                    ResultsPane::Empty
                } else {
                    ResultsPane::Results(
                        self.results
                            .iter()
                            .map(|r| ResultView::from_result(r, &endpoints))
                            .collect(),
                    )
                };
            }
            Err(e) => {
                tracing::warn!("Search failed: {}", e);
                self.results.clear();
                self.pane = ResultsPane::Failed {
                    message: e.to_string(),
                    fallback_url: endpoints.fallback_url(query),
                };
            }
        }
    }

    /// Open the citation dialog for result `index` (zero-based).
    ///
    /// Returns false when the result has no citation link or the lookup
    /// fails; failures are logged and no dialog is shown.
    pub async fn cite(&mut self, index: usize) -> bool {
        let Some(citation_url) = self
            .pane
            .results()
            .get(index)
            .and_then(|v| v.citation_url())
            .map(str::to_string)
        else {
            tracing::warn!("Result {} has no citation link", index + 1);
            return false;
        };

        let reply: FetchReply = self
            .fetcher
            .handle(FetchRequest::citation(&citation_url))
            .await;

        match reply.into_result() {
            Ok(html) => {
                let data = parse_citation_html(&html);
                tracing::debug!(
                    "Citation dialog: {} styles, {} exports",
                    data.citations.len(),
                    data.exports.len()
                );
                let dialog = CitationDialog::from_data(&data, self.fetcher.endpoints())
                    .with_feedback(self.copy_feedback);
                if self.dialog.open(dialog) {
                    tracing::debug!("Replaced the previous citation dialog");
                }
                self.citation = Some(data);
                true
            }
            Err(e) => {
                tracing::warn!("Error fetching citations: {}", e);
                false
            }
        }
    }

    /// Copy citation row `row` (zero-based) of the open dialog
    pub fn copy_citation(
        &mut self,
        row: usize,
        clipboard: &dyn Clipboard,
        now: Instant,
    ) -> Result<(), ClipboardError> {
        match self.dialog.current_mut() {
            Some(dialog) => dialog.copy(row, clipboard, now),
            None => Err(ClipboardError::NoSuchRow(row + 1)),
        }
    }

    /// Forward a dialog interaction; returns true if the dialog closed
    pub fn close_dialog(&mut self, event: DialogEvent) -> bool {
        let closed = self.dialog.handle(event);
        if closed {
            self.citation = None;
        }
        closed
    }
}
