//! Reusable TUI widgets.

mod confirm;

pub use confirm::render_confirm_dialog;
