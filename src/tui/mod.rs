//! Terminal user interface for the playground.
//!
//! Runs the main event loop with ratatui and crossterm. Query runs are
//! spawned as tokio tasks and report back over an mpsc channel, so the
//! interface stays responsive while a query is in flight.

pub mod app;
mod clipboard;
mod ui;
pub mod widgets;

pub use app::{Action, App, Focus, InputState};

use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::deeplink::{ShareLink, SETTLE_DELAY};
use crate::error::{PlayError, Result};
use crate::query::{self, Outcome};

/// Terminal events.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// A periodic tick (nothing happened within the poll window).
    Tick,
}

/// Messages sent from background tasks to the main loop.
#[derive(Debug)]
pub enum RunEvent {
    /// A run completed.
    Finished { seq: u64, outcome: Outcome },
    /// The settle delay elapsed; offer the deep-link confirmation.
    OfferConfirmation,
}

/// Options for starting the interface.
#[derive(Debug, Default)]
pub struct TuiOptions {
    /// Pre-filled project URL.
    pub url: Option<String>,
    /// Pre-filled API key.
    pub key: Option<String>,
    /// Pre-filled query expression.
    pub query: Option<String>,
    /// Complete deep link whose auto-run should be offered.
    pub pending_link: Option<ShareLink>,
    /// Request timeout for runs.
    pub timeout_secs: u64,
}

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    tick_rate: Duration,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        let terminal = Self::setup_terminal()?;
        Ok(Self {
            terminal,
            tick_rate: Duration::from_millis(100),
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| PlayError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| PlayError::internal(format!("Failed to enter alternate screen: {e}")))?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)
            .map_err(|e| PlayError::internal(format!("Failed to create terminal: {e}")))?;

        Ok(terminal)
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| PlayError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| PlayError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| PlayError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Polls for the next terminal event within the tick window.
    fn next_event(&self) -> Result<Option<Event>> {
        if event::poll(self.tick_rate)
            .map_err(|e| PlayError::internal(format!("Failed to poll events: {e}")))?
        {
            let event = event::read()
                .map_err(|e| PlayError::internal(format!("Failed to read event: {e}")))?;

            match event {
                CrosstermEvent::Key(key) => Ok(Some(Event::Key(key))),
                CrosstermEvent::Resize(width, height) => Ok(Some(Event::Resize(width, height))),
                _ => Ok(Some(Event::Tick)),
            }
        } else {
            Ok(Some(Event::Tick))
        }
    }

    /// Runs the main event loop until the user quits.
    pub async fn run(&mut self, options: TuiOptions) -> Result<()> {
        // Restore the terminal if anything panics mid-draw
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        let timeout_secs = options.timeout_secs;
        let mut app = App::new(&options);
        let (tx, mut rx) = mpsc::unbounded_channel::<RunEvent>();

        // A complete link gets one auto-run offer per process, after a
        // short delay so the first frame is already on screen.
        if app.pending_link.is_some() && app.gate.try_arm() {
            debug!("deep link complete, scheduling auto-run confirmation");
            let tx = tx.clone();
            tokio::spawn(async move {
                tokio::time::sleep(SETTLE_DELAY).await;
                let _ = tx.send(RunEvent::OfferConfirmation);
            });
        }

        while app.running {
            self.terminal
                .draw(|frame| ui::render(frame, &app))
                .map_err(|e| PlayError::internal(format!("Failed to draw: {e}")))?;

            while let Ok(run_event) = rx.try_recv() {
                match run_event {
                    RunEvent::Finished { seq, outcome } => {
                        if !app.session.finish(seq, outcome) {
                            debug!(seq, "ignoring stale run completion");
                        }
                    }
                    RunEvent::OfferConfirmation => app.offer_confirmation(),
                }
            }

            app.expire_flash();

            if let Some(event) = self.next_event()? {
                if let Some(action) = app.handle_event(event) {
                    Self::perform(&mut app, action, &tx, timeout_secs);
                }
            }
        }

        let _ = panic::take_hook();

        Ok(())
    }

    /// Carries out an action requested by the event handler.
    fn perform(
        app: &mut App,
        action: Action,
        tx: &mpsc::UnboundedSender<RunEvent>,
        timeout_secs: u64,
    ) {
        match action {
            Action::Quit => app.running = false,
            Action::Copy(text) => match clipboard::copy(&text) {
                Ok(()) => app.set_flash("Copied"),
                Err(e) => {
                    warn!("clipboard copy failed: {e}");
                    app.set_flash("Clipboard unavailable");
                }
            },
            Action::Submit {
                credentials,
                expression,
            } => match app.session.begin(&credentials, &expression) {
                Ok(ticket) => {
                    app.validation_error = None;
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let outcome = query::run_to_outcome(
                            &ticket.credentials,
                            &ticket.expression,
                            timeout_secs,
                        )
                        .await;
                        let _ = tx.send(RunEvent::Finished {
                            seq: ticket.seq,
                            outcome,
                        });
                    });
                }
                Err(e) => {
                    app.validation_error = Some(match e {
                        PlayError::Validation(message) => message,
                        other => other.to_string(),
                    });
                }
            },
        }
    }
}

/// Runs the interface to completion, restoring the terminal afterwards.
pub async fn run(options: TuiOptions) -> Result<()> {
    let mut tui = Tui::new()?;
    let result = tui.run(options).await;
    let restored = tui.restore_terminal();
    result.and(restored)
}
