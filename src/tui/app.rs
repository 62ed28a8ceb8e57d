//! Application state for the TUI.
//!
//! Holds the form fields, focus, and confirmation-dialog state, and
//! translates key events into engine actions. All execution state itself
//! lives in the [`QuerySession`]; the interface is a projection of it.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

use crate::client::Credentials;
use crate::deeplink::{ConfirmationGate, ShareLink};
use crate::session::{ExecutionPhase, QuerySession};

use super::{Event, TuiOptions};

/// How long transient status messages stay visible.
const FLASH_DURATION: Duration = Duration::from_millis(1000);

/// Which form field or panel currently has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Url,
    Key,
    Query,
    History,
}

impl Focus {
    /// Cycles to the next focus target.
    pub fn next(self) -> Self {
        match self {
            Self::Url => Self::Key,
            Self::Key => Self::Query,
            Self::Query => Self::History,
            Self::History => Self::Url,
        }
    }

    /// Cycles to the previous focus target.
    pub fn prev(self) -> Self {
        match self {
            Self::Url => Self::History,
            Self::Key => Self::Url,
            Self::Query => Self::Key,
            Self::History => Self::Query,
        }
    }
}

/// Input state for a single-line text field.
#[derive(Debug, Default)]
pub struct InputState {
    /// Current input text.
    pub text: String,
    /// Cursor position as a character index.
    pub cursor: usize,
}

impl InputState {
    /// Creates an empty input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an input pre-filled with the given text, cursor at the end.
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self) -> usize {
        self.text
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index();
            self.text.remove(at);
        }
    }

    /// Deletes the character at the cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index();
            self.text.remove(at);
        }
    }

    /// Moves the cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    /// Moves the cursor to the start of the input.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Moves the cursor to the end of the input.
    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Replaces the text, cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.char_count();
    }

    /// Returns true if the input is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// An engine action requested by the user.
#[derive(Debug)]
pub enum Action {
    /// Submit the given snapshots for execution.
    Submit {
        credentials: Credentials,
        expression: String,
    },
    /// Copy text to the clipboard.
    Copy(String),
    /// Leave the interface.
    Quit,
}

/// Main application state.
pub struct App {
    /// Whether the interface is still running.
    pub running: bool,
    /// Current focus target.
    pub focus: Focus,
    /// Project URL field.
    pub url_input: InputState,
    /// API key field.
    pub key_input: InputState,
    /// Query expression field.
    pub query_input: InputState,
    /// The execution engine; single source of truth for run state.
    pub session: QuerySession,
    /// One-shot gate for the deep-link confirmation.
    pub gate: ConfirmationGate,
    /// Complete link whose auto-run awaits confirmation.
    pub pending_link: Option<ShareLink>,
    /// Whether the confirmation dialog is on screen.
    pub confirm_visible: bool,
    /// Last submission-validation message, shown in the error pane.
    pub validation_error: Option<String>,
    /// Selected history entry, 0 = newest.
    pub history_selected: usize,
    /// Position while recalling history into the query field.
    recall_position: Option<usize>,
    /// Unsaved query text stashed while recalling.
    recall_draft: String,
    /// Transient status message.
    flash: Option<(String, Instant)>,
}

impl App {
    /// Creates the application state from startup options.
    pub fn new(options: &TuiOptions) -> Self {
        Self {
            running: true,
            focus: Focus::default(),
            url_input: InputState::with_text(options.url.clone().unwrap_or_default()),
            key_input: InputState::with_text(options.key.clone().unwrap_or_default()),
            query_input: InputState::with_text(options.query.clone().unwrap_or_default()),
            session: QuerySession::new(),
            gate: ConfirmationGate::new(),
            pending_link: options.pending_link.clone(),
            confirm_visible: false,
            validation_error: None,
            history_selected: 0,
            recall_position: None,
            recall_draft: String::new(),
            flash: None,
        }
    }

    /// Shows the auto-run confirmation if a link is still pending.
    pub fn offer_confirmation(&mut self) {
        if self.pending_link.is_some() {
            self.confirm_visible = true;
        }
    }

    /// Sets a transient status message.
    pub fn set_flash(&mut self, message: impl Into<String>) {
        self.flash = Some((message.into(), Instant::now()));
    }

    /// Clears the status message once it has been visible long enough.
    pub fn expire_flash(&mut self) {
        if let Some((_, since)) = &self.flash {
            if since.elapsed() >= FLASH_DURATION {
                self.flash = None;
            }
        }
    }

    /// Returns the current status message, if any.
    pub fn flash_message(&self) -> Option<&str> {
        self.flash.as_ref().map(|(message, _)| message.as_str())
    }

    /// Returns the history entry at the current selection (0 = newest).
    pub fn selected_history_entry(&self) -> Option<&str> {
        let entries = self.session.history().entries();
        entries
            .len()
            .checked_sub(1 + self.history_selected)
            .and_then(|index| self.session.history().get(index))
    }

    /// Handles a terminal event, possibly yielding an action.
    pub fn handle_event(&mut self, event: Event) -> Option<Action> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(..) | Event::Tick => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if self.confirm_visible {
            return self.handle_confirm_key(key);
        }

        // Global shortcuts
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }

        match key.code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Enter => match self.focus {
                Focus::History => self.selected_history_entry().map(|entry| {
                    Action::Copy(entry.to_string())
                }),
                _ => self.submit(),
            },
            KeyCode::Up => {
                match self.focus {
                    Focus::Query => self.recall_prev(),
                    Focus::History => {
                        let len = self.session.history().len();
                        if len > 0 && self.history_selected + 1 < len {
                            self.history_selected += 1;
                        }
                    }
                    _ => {}
                }
                None
            }
            KeyCode::Down => {
                match self.focus {
                    Focus::Query => self.recall_next(),
                    Focus::History => {
                        self.history_selected = self.history_selected.saturating_sub(1);
                    }
                    _ => {}
                }
                None
            }
            KeyCode::Char('c') if self.focus == Focus::History => self
                .selected_history_entry()
                .map(|entry| Action::Copy(entry.to_string())),
            KeyCode::Char(c) => {
                if self.focus == Focus::Query {
                    self.recall_position = None;
                }
                if let Some(input) = self.focused_input_mut() {
                    input.insert(c);
                }
                None
            }
            KeyCode::Backspace => {
                if let Some(input) = self.focused_input_mut() {
                    input.backspace();
                }
                None
            }
            KeyCode::Delete => {
                if let Some(input) = self.focused_input_mut() {
                    input.delete();
                }
                None
            }
            KeyCode::Left => {
                if let Some(input) = self.focused_input_mut() {
                    input.move_left();
                }
                None
            }
            KeyCode::Right => {
                if let Some(input) = self.focused_input_mut() {
                    input.move_right();
                }
                None
            }
            KeyCode::Home => {
                if let Some(input) = self.focused_input_mut() {
                    input.move_home();
                }
                None
            }
            KeyCode::End => {
                if let Some(input) = self.focused_input_mut() {
                    input.move_end();
                }
                None
            }
            _ => None,
        }
    }

    /// Keys while the confirmation dialog is up: accept or decline only.
    fn handle_confirm_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.confirm_visible = false;
                let link = self.pending_link.take()?;
                let credentials = link.credentials()?;
                let expression = link.expression?;
                Some(Action::Submit {
                    credentials,
                    expression,
                })
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                // Declined: stay idle with the fields pre-filled.
                self.confirm_visible = false;
                self.pending_link = None;
                None
            }
            _ => None,
        }
    }

    /// Builds a submit action from the current form fields.
    fn submit(&mut self) -> Option<Action> {
        // The engine refuses concurrent runs too; this just keeps the
        // error pane quiet while one is in flight.
        if self.session.phase() == ExecutionPhase::Running {
            return None;
        }
        self.recall_position = None;
        Some(Action::Submit {
            credentials: Credentials::new(self.url_input.text.clone(), self.key_input.text.clone()),
            expression: self.query_input.text.clone(),
        })
    }

    fn focused_input_mut(&mut self) -> Option<&mut InputState> {
        match self.focus {
            Focus::Url => Some(&mut self.url_input),
            Focus::Key => Some(&mut self.key_input),
            Focus::Query => Some(&mut self.query_input),
            Focus::History => None,
        }
    }

    /// Recalls the previous (older) history entry into the query field.
    fn recall_prev(&mut self) {
        let entries = self.session.history().entries();
        if entries.is_empty() {
            return;
        }

        let position = match self.recall_position {
            None => {
                self.recall_draft = self.query_input.text.clone();
                entries.len() - 1
            }
            Some(position) if position > 0 => position - 1,
            Some(_) => return,
        };

        self.recall_position = Some(position);
        let text = entries[position].clone();
        self.query_input.set_text(text);
    }

    /// Recalls the next (newer) history entry, or restores the draft.
    fn recall_next(&mut self) {
        let entries = self.session.history().entries();
        match self.recall_position {
            Some(position) if position + 1 < entries.len() => {
                self.recall_position = Some(position + 1);
                let text = entries[position + 1].clone();
                self.query_input.set_text(text);
            }
            Some(_) => {
                self.recall_position = None;
                let draft = std::mem::take(&mut self.recall_draft);
                self.query_input.set_text(draft);
            }
            None => {}
        }
    }
}
