//! Clipboard access.

use base64::Engine;
use std::io::Write;
use std::sync::Mutex;

/// Clipboard errors
#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No citation row {0}")]
    NoSuchRow(usize),
}

/// Somewhere copied citation text can go
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// OSC 52 escape sequence that asks the terminal to set the clipboard.
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{}\x07", encoded)
}

/// Copies through the terminal using OSC 52.
///
/// Works in kitty, WezTerm, iTerm2, Ghostty and most modern terminals,
/// including over SSH.
#[derive(Debug, Default, Clone, Copy)]
pub struct Osc52Clipboard;

impl Clipboard for Osc52Clipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout();
        stdout.write_all(osc52_sequence(text).as_bytes())?;
        stdout.flush()?;
        tracing::debug!("Copied {} characters via OSC 52", text.chars().count());
        Ok(())
    }
}

/// Records copies in memory
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    copies: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything copied so far, oldest first
    pub fn copies(&self) -> Vec<String> {
        self.copies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Most recent copy
    pub fn last(&self) -> Option<String> {
        self.copies().pop()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        self.copies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(text.to_string());
        Ok(())
    }
}
