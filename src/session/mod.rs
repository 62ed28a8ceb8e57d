//! Execution state for the playground session.
//!
//! One `QuerySession` exists per process and is the single source of truth
//! the presentation layer reads: the current phase, the last outcome, and
//! the history ledger. Runs move through `Idle -> Running ->
//! (Succeeded | Failed)`; a new submission restarts the cycle.

mod history;

pub use history::HistoryLedger;

use crate::client::Credentials;
use crate::error::{PlayError, Result};
use crate::query::{self, Outcome};

/// The phase of the current (or last) run. Exactly one is current at any
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPhase {
    /// No run has started yet, or the last outcome was cleared.
    #[default]
    Idle,
    /// A run is in flight; submissions are refused.
    Running,
    /// The last run completed without an error.
    Succeeded,
    /// The last run completed with an error.
    Failed,
}

/// A started run: the sequence number plus the snapshots taken at
/// submission time. Field edits after submission never affect the run.
#[derive(Debug, Clone)]
pub struct RunTicket {
    /// Identifies the run for completion; stale tickets are ignored.
    pub seq: u64,
    /// Credentials snapshot for building the run's client handle.
    pub credentials: Credentials,
    /// The exact expression text being executed.
    pub expression: String,
}

/// The session state machine.
#[derive(Debug, Default)]
pub struct QuerySession {
    phase: ExecutionPhase,
    outcome: Option<Outcome>,
    history: HistoryLedger,
    run_seq: u64,
    active_expression: Option<String>,
}

impl QuerySession {
    /// Creates a fresh session in the idle phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current execution phase.
    pub fn phase(&self) -> ExecutionPhase {
        self.phase
    }

    /// Returns the last run's outcome, if one has completed.
    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    /// Returns the history ledger.
    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    /// Validates a submission and starts a run.
    ///
    /// Refuses while a run is in flight and when the URL, key, or
    /// expression is missing; in both cases the state is unchanged and
    /// nothing is recorded. On success the prior outcome is cleared, the
    /// phase becomes `Running`, and the returned ticket carries the input
    /// snapshots.
    pub fn begin(&mut self, credentials: &Credentials, expression: &str) -> Result<RunTicket> {
        if self.phase == ExecutionPhase::Running {
            return Err(PlayError::validation("A query is already running."));
        }
        if !credentials.is_complete() {
            return Err(PlayError::validation(
                "Please provide both the API Key and URL.",
            ));
        }
        if expression.trim().is_empty() {
            return Err(PlayError::validation("Please provide a query to run."));
        }

        self.run_seq += 1;
        self.outcome = None;
        self.phase = ExecutionPhase::Running;
        self.active_expression = Some(expression.to_string());

        Ok(RunTicket {
            seq: self.run_seq,
            credentials: credentials.clone(),
            expression: expression.to_string(),
        })
    }

    /// Completes a run.
    ///
    /// Stale completions (a ticket older than the current run) are ignored
    /// and return false. Otherwise the outcome is stored, the phase moves
    /// to `Succeeded` or `Failed`, and the run's expression is appended to
    /// the history ledger; both successful and failed completions are
    /// recorded.
    pub fn finish(&mut self, seq: u64, outcome: Outcome) -> bool {
        if seq != self.run_seq || self.phase != ExecutionPhase::Running {
            return false;
        }

        if let Some(expression) = self.active_expression.take() {
            self.history.append(expression);
        }
        self.phase = if outcome.is_success() {
            ExecutionPhase::Succeeded
        } else {
            ExecutionPhase::Failed
        };
        self.outcome = Some(outcome);
        true
    }

    /// Runs one submission end to end: begin, execute against a fresh
    /// client handle, finish. Returns the stored outcome.
    pub async fn run(
        &mut self,
        credentials: &Credentials,
        expression: &str,
        timeout_secs: u64,
    ) -> Result<&Outcome> {
        let ticket = self.begin(credentials, expression)?;
        let outcome =
            query::run_to_outcome(&ticket.credentials, &ticket.expression, timeout_secs).await;
        self.finish(ticket.seq, outcome);

        self.outcome
            .as_ref()
            .ok_or_else(|| PlayError::internal("run completed without an outcome"))
    }
}
