//! Result list view.

use std::io::{self, Write};

use super::Theme;
use crate::fetch::Endpoints;
use crate::models::{LinkKind, SearchResult};
use crate::ui::truncate_with_ellipsis;

/// Separator placed between link labels
pub const SEPARATOR: &str = " · ";

pub const LOADING_TEXT: &str = "Searching...";
pub const EMPTY_TEXT: &str = "No results found";
pub const FALLBACK_LINK_TEXT: &str = "Click here to search on Google Scholar";

/// Join the labels that are present, with [`SEPARATOR`] only between them.
pub fn join_links<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .filter_map(|item| {
            let label: &str = item.as_ref();
            (!label.is_empty()).then(|| label.to_string())
        })
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Something the user can do from a result's link row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Open the citation dialog for this result
    Cite { citation_url: String },
    /// Follow an outbound link
    Open { label: String, url: String },
}

impl LinkAction {
    pub fn label(&self) -> &str {
        match self {
            LinkAction::Cite { .. } => "Cite",
            LinkAction::Open { label, .. } => label,
        }
    }
}

/// One rendered search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub title: Option<String>,
    pub url: Option<String>,
    pub authors: Option<String>,
    pub snippet: Option<String>,
    /// Cite, Cited by, Related articles, All versions; only those present
    pub actions: Vec<LinkAction>,
}

impl ResultView {
    pub fn from_result(result: &SearchResult, endpoints: &Endpoints) -> Self {
        let links = &result.links;
        let mut actions = Vec::new();

        if let Some(cid) = links.cite_data_id.as_deref() {
            actions.push(LinkAction::Cite {
                citation_url: endpoints.citation_url(cid),
            });
        }
        if let Some(cited_by) = &links.cited_by {
            actions.push(LinkAction::Open {
                label: cited_by.label(LinkKind::CitedBy),
                url: cited_by.url.clone(),
            });
        }
        if let Some(related) = &links.related {
            actions.push(LinkAction::Open {
                label: "Related articles".to_string(),
                url: related.url.clone(),
            });
        }
        if let Some(versions) = &links.versions {
            actions.push(LinkAction::Open {
                label: versions.label(LinkKind::Versions),
                url: versions.url.clone(),
            });
        }

        Self {
            title: result.title.clone(),
            url: result.url.clone(),
            authors: result.authors.clone(),
            snippet: result.snippet.clone(),
            actions,
        }
    }

    /// Link labels joined with separators, `None` when there are no links
    pub fn link_row(&self) -> Option<String> {
        if self.actions.is_empty() {
            return None;
        }
        Some(join_links(self.actions.iter().map(LinkAction::label)))
    }

    /// Citation URL behind the "Cite" action, if any
    pub fn citation_url(&self) -> Option<&str> {
        self.actions.iter().find_map(|a| match a {
            LinkAction::Cite { citation_url } => Some(citation_url.as_str()),
            LinkAction::Open { .. } => None,
        })
    }
}

/// What the results area currently shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultsPane {
    #[default]
    Idle,
    Loading {
        query: String,
    },
    Empty,
    Results(Vec<ResultView>),
    Failed {
        message: String,
        fallback_url: String,
    },
}

impl ResultsPane {
    pub fn results(&self) -> &[ResultView] {
        match self {
            ResultsPane::Results(views) => views,
            _ => &[],
        }
    }

    /// Text of the failure line, without the fallback link
    pub fn failure_text(message: &str) -> String {
        format!("Unable to fetch results directly: {}. ", message)
    }
}

/// Draw the results area.
pub fn draw_pane<W: Write>(
    out: &mut W,
    pane: &ResultsPane,
    theme: &Theme,
    width: usize,
) -> io::Result<()> {
    match pane {
        ResultsPane::Idle => Ok(()),
        ResultsPane::Loading { .. } => writeln!(out, "{}", theme.dim(LOADING_TEXT)),
        ResultsPane::Empty => writeln!(out, "{}", EMPTY_TEXT),
        ResultsPane::Failed {
            message,
            fallback_url,
        } => {
            writeln!(
                out,
                "{}{}",
                theme.error(&ResultsPane::failure_text(message)),
                FALLBACK_LINK_TEXT
            )?;
            writeln!(out, "  {}", theme.link(fallback_url))
        }
        ResultsPane::Results(views) => {
            for (i, view) in views.iter().enumerate() {
                draw_result(out, i + 1, view, theme, width)?;
            }
            Ok(())
        }
    }
}

fn draw_result<W: Write>(
    out: &mut W,
    number: usize,
    view: &ResultView,
    theme: &Theme,
    width: usize,
) -> io::Result<()> {
    let indent = "    ";
    let text_width = width.saturating_sub(indent.len()).max(20);

    let title = view.title.as_deref().unwrap_or("(untitled)");
    writeln!(out, "{:>3} {}", format!("{}.", number), theme.title(title))?;

    if let Some(url) = &view.url {
        writeln!(out, "{}{}", indent, theme.link(&truncate_with_ellipsis(url, text_width)))?;
    }
    if let Some(authors) = &view.authors {
        writeln!(out, "{}{}", indent, theme.accent(authors))?;
    }
    if let Some(snippet) = &view.snippet {
        writeln!(out, "{}{}", indent, snippet)?;
    }
    if let Some(row) = view.link_row() {
        writeln!(out, "{}{}", indent, theme.dim(&row))?;
        for action in &view.actions {
            if let LinkAction::Open { label, url } = action {
                writeln!(
                    out,
                    "{}  {} {}",
                    indent,
                    theme.dim(&format!("{}:", label)),
                    theme.link(&truncate_with_ellipsis(url, text_width))
                )?;
            }
        }
    }
    writeln!(out)
}
