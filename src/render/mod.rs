//! Turning parsed data into something a person can read and act on.
//!
//! Rendering is split into view models, which hold the interaction rules
//! (which links exist, separator placement, copy feedback, the single open
//! dialog), and drawing functions that write those views to a terminal.

mod clipboard;
mod dialog;
mod results;

pub use clipboard::{osc52_sequence, Clipboard, ClipboardError, MemoryClipboard, Osc52Clipboard};
pub use dialog::{
    draw_dialog, CitationDialog, CitationRow, DialogEvent, DialogSlot, COPIED_TEXT,
    COPY_FEEDBACK, DIALOG_TITLE, NO_CITATIONS_TEXT,
};
pub use results::{
    draw_pane, join_links, LinkAction, ResultView, ResultsPane, EMPTY_TEXT, FALLBACK_LINK_TEXT,
    LOADING_TEXT, SEPARATOR,
};

use owo_colors::OwoColorize;

/// Colour handling for drawn output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub color: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            color: crate::ui::is_terminal(),
        }
    }
}

impl Theme {
    pub fn plain() -> Self {
        Self { color: false }
    }

    fn title(&self, text: &str) -> String {
        if self.color {
            text.blue().bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.color {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    fn accent(&self, text: &str) -> String {
        if self.color {
            text.green().to_string()
        } else {
            text.to_string()
        }
    }

    fn link(&self, text: &str) -> String {
        if self.color {
            text.cyan().underline().to_string()
        } else {
            text.to_string()
        }
    }

    fn error(&self, text: &str) -> String {
        if self.color {
            text.red().to_string()
        } else {
            text.to_string()
        }
    }
}
