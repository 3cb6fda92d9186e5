//! Citation dialog view.

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, ContentArrangement, Table};
use std::io::{self, Write};
use std::time::{Duration, Instant};
use url::Url;

use super::{join_links, ClipboardError, Clipboard, Theme};
use crate::fetch::Endpoints;
use crate::models::{CitationData, ExportLink};

pub const DIALOG_TITLE: &str = "Citation Formats";
pub const NO_CITATIONS_TEXT: &str = "No citations available";
pub const COPIED_TEXT: &str = "Copied!";

/// How long "Copied!" replaces a citation after it is copied
pub const COPY_FEEDBACK: Duration = Duration::from_millis(1000);

/// One style row of the dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationRow {
    pub style: String,
    pub text: String,
    copied_until: Option<Instant>,
}

impl CitationRow {
    fn new(style: &str, text: &str) -> Self {
        Self {
            style: style.to_string(),
            text: text.to_string(),
            copied_until: None,
        }
    }

    /// Text to show at `now`: the feedback while it lasts, else the citation
    pub fn display_text(&self, now: Instant) -> &str {
        match self.copied_until {
            Some(until) if now < until => COPIED_TEXT,
            _ => &self.text,
        }
    }
}

/// The citation dialog for one result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationDialog {
    pub rows: Vec<CitationRow>,
    /// Export links with hrefs resolved against the Scholar host
    pub exports: Vec<ExportLink>,
    feedback: Duration,
}

impl CitationDialog {
    pub fn from_data(data: &CitationData, endpoints: &Endpoints) -> Self {
        let base = Url::parse(&endpoints.base_url).ok();

        Self {
            rows: data
                .citations
                .iter()
                .map(|c| CitationRow::new(&c.style, &c.text))
                .collect(),
            exports: data
                .exports
                .iter()
                .map(|e| {
                    let url = base
                        .as_ref()
                        .and_then(|b| b.join(&e.url).ok())
                        .map(|u| u.to_string())
                        .unwrap_or_else(|| e.url.clone());
                    ExportLink::new(e.format.clone(), url)
                })
                .collect(),
            feedback: COPY_FEEDBACK,
        }
    }

    /// Change how long copy feedback stays visible
    pub fn with_feedback(mut self, feedback: Duration) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn has_citations(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Copy row `index` (zero-based) to the clipboard and start the feedback
    pub fn copy(
        &mut self,
        index: usize,
        clipboard: &dyn Clipboard,
        now: Instant,
    ) -> Result<(), ClipboardError> {
        let feedback = self.feedback;
        let row = self
            .rows
            .get_mut(index)
            .ok_or(ClipboardError::NoSuchRow(index + 1))?;

        clipboard.copy(&row.text)?;
        row.copied_until = Some(now + feedback);
        tracing::debug!("Copied {} citation", row.style);
        Ok(())
    }

    /// Export format labels joined for the export row
    pub fn export_row(&self) -> Option<String> {
        if self.exports.is_empty() {
            return None;
        }
        Some(join_links(self.exports.iter().map(|e| e.format.as_str())))
    }
}

/// Interactions with an open dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEvent {
    /// The close control
    CloseButton,
    /// A click on the overlay around the dialog
    ClickOutside,
    /// A click within the dialog bounds
    ClickInside,
}

/// Holds at most one open dialog
#[derive(Debug, Clone, Default)]
pub struct DialogSlot {
    current: Option<CitationDialog>,
}

impl DialogSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `dialog`, removing any dialog already open.
    ///
    /// Returns true when a previous dialog was replaced.
    pub fn open(&mut self, dialog: CitationDialog) -> bool {
        self.current.replace(dialog).is_some()
    }

    /// Apply an event; returns true if the dialog closed
    pub fn handle(&mut self, event: DialogEvent) -> bool {
        if self.current.is_none() {
            return false;
        }
        match event {
            DialogEvent::CloseButton | DialogEvent::ClickOutside => {
                self.current = None;
                true
            }
            DialogEvent::ClickInside => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&CitationDialog> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self) -> Option<&mut CitationDialog> {
        self.current.as_mut()
    }
}

/// Draw the dialog as a framed table followed by export links.
pub fn draw_dialog<W: Write>(
    out: &mut W,
    dialog: &CitationDialog,
    theme: &Theme,
    width: usize,
    now: Instant,
) -> io::Result<()> {
    writeln!(out, "{}  {}", theme.title(DIALOG_TITLE), theme.dim("[x] close"))?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width.min(u16::MAX as usize) as u16);
    if !theme.color {
        table.force_no_tty();
    }

    if dialog.has_citations() {
        table.set_header(vec!["#", "Style", "Citation (copy with :copy N)"]);
        for (i, row) in dialog.rows.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(&row.style).add_attribute(Attribute::Bold),
                Cell::new(row.display_text(now)),
            ]);
        }
    } else {
        table.add_row(vec![Cell::new(NO_CITATIONS_TEXT)]);
    }

    if let Some(exports) = dialog.export_row() {
        table.add_row(vec![Cell::new(""), Cell::new("Export"), Cell::new(exports)]);
    }
    writeln!(out, "{table}")?;

    for export in &dialog.exports {
        writeln!(
            out,
            "  {} {}",
            theme.dim(&format!("{}:", export.format)),
            theme.link(&export.url)
        )?;
    }
    Ok(())
}
