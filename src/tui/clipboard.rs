//! Clipboard support for the TUI.
//!
//! Copies history entries using the native clipboard where available,
//! falling back to the OSC 52 escape sequence so copying still works over
//! SSH and in terminals without a system clipboard.

use arboard::Clipboard;
use std::io::Write;

/// Copies text to the clipboard.
pub fn copy(text: &str) -> Result<(), ClipboardError> {
    match Clipboard::new() {
        Ok(mut clipboard) => clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::Copy(e.to_string())),
        Err(_) => copy_osc52(text),
    }
}

/// Copies text using the OSC 52 escape sequence.
///
/// Writes directly to stdout; works in most modern terminals.
fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
    use base64::{engine::general_purpose::STANDARD, Engine};

    let encoded = STANDARD.encode(text);
    // OSC 52 format: ESC ] 52 ; c ; <base64-data> ESC \
    let sequence = format!("\x1b]52;c;{encoded}\x1b\\");

    let mut stdout = std::io::stdout();
    stdout
        .write_all(sequence.as_bytes())
        .and_then(|_| stdout.flush())
        .map_err(|e| ClipboardError::Copy(format!("Failed to write OSC 52: {e}")))
}

/// Clipboard operation errors.
#[derive(Debug, Clone)]
pub enum ClipboardError {
    /// Failed to copy to the clipboard.
    Copy(String),
}

impl std::fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Copy(e) => write!(f, "Failed to copy to clipboard: {e}"),
        }
    }
}

impl std::error::Error for ClipboardError {}
