//! Expression execution.
//!
//! Runs one expression against a query backend and normalizes whatever
//! happens into an [`Outcome`]. Nothing escapes this boundary: backend
//! rejections become `Failure` with the backend's error payload, and every
//! internal error (bad expression, dead network) becomes `Failure` with an
//! "Unexpected error" description.

use serde_json::Value;
use std::fmt;

use crate::client::{self, ApiResponse, Credentials, QueryBackend};
use crate::error::Result;
use crate::expr;

/// The normalized result of one execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The call completed and reported no error.
    Success {
        /// Opaque structured result data.
        data: Value,
    },
    /// The call reported an error, or execution itself failed.
    Failure {
        /// Opaque error payload: structured for backend errors, a string
        /// for unexpected host-level failures.
        error: Value,
    },
}

impl Outcome {
    /// Builds an outcome from a backend response envelope.
    pub fn from_response(response: ApiResponse) -> Self {
        match response.error {
            Some(error) => Self::Failure {
                error: error.to_value(),
            },
            None => Self::Success {
                data: response.data,
            },
        }
    }

    /// Wraps an internal failure the way a thrown exception would surface.
    pub fn unexpected(description: impl fmt::Display) -> Self {
        Self::Failure {
            error: Value::String(format!("Unexpected error: {description}")),
        }
    }

    /// Returns true for successful outcomes.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Returns the data payload of a successful outcome.
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    /// Returns the error payload of a failed outcome.
    pub fn error(&self) -> Option<&Value> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }

    /// Pretty-prints the payload (data or error) for display.
    pub fn pretty(&self) -> String {
        let value = match self {
            Self::Success { data } => data,
            Self::Failure { error } => error,
        };
        serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
    }
}

/// Executes expressions against one backend handle.
pub struct QueryExecutor<'a> {
    backend: &'a dyn QueryBackend,
}

impl<'a> QueryExecutor<'a> {
    /// Creates an executor over the given backend.
    pub fn new(backend: &'a dyn QueryBackend) -> Self {
        Self { backend }
    }

    /// Executes an expression and normalizes the result.
    ///
    /// This never fails: every error path is folded into
    /// `Outcome::Failure`.
    pub async fn execute(&self, expression: &str) -> Outcome {
        match self.try_execute(expression).await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::unexpected(e),
        }
    }

    async fn try_execute(&self, expression: &str) -> Result<Outcome> {
        let request = expr::compile(expression)?;
        let response = self.backend.execute(&request).await?;
        Ok(Outcome::from_response(response))
    }
}

/// Runs one expression end to end: builds a fresh backend from the
/// credentials snapshot, executes, and normalizes. The factory error path
/// feeds the same normalization, so callers always get an outcome.
pub async fn run_to_outcome(
    credentials: &Credentials,
    expression: &str,
    timeout_secs: u64,
) -> Outcome {
    let backend = match client::connect(credentials, timeout_secs) {
        Ok(backend) => backend,
        Err(e) => return Outcome::unexpected(e),
    };

    QueryExecutor::new(backend.as_ref()).execute(expression).await
}
