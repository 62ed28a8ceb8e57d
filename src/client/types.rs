//! Response envelope types for the Supabase API client.
//!
//! Every executed query resolves to an `ApiResponse` carrying a `data`
//! value and an optional `error`, mirroring the envelope the hosted API
//! returns to its official clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The `{data, error}` pair produced by executing one query request.
///
/// Transport-level failures never reach this type; they surface as `Err`
/// from the backend and are normalized by the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// Structured result data. `Null` when the backend returned no body.
    pub data: Value,

    /// Backend-reported error, if the request was rejected.
    pub error: Option<ApiError>,
}

impl ApiResponse {
    /// Creates a successful response with the given data.
    pub fn success(data: Value) -> Self {
        Self { data, error: None }
    }

    /// Creates a failed response with the given error.
    pub fn failure(error: ApiError) -> Self {
        Self {
            data: Value::Null,
            error: Some(error),
        }
    }

    /// Returns true if the backend reported an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A backend-level error as reported by PostgREST.
///
/// The hosted API answers rejected requests with a JSON body shaped
/// `{message, code, details, hint}`; anything that does not parse as that
/// shape is folded into a synthesized message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable error description.
    #[serde(default)]
    pub message: String,

    /// PostgREST/Postgres error code (e.g. `PGRST116`, `42P01`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Additional error details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// Suggested remediation, when the backend offers one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ApiError {
    /// Creates an error with just a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Builds an error from an HTTP status line and response body.
    ///
    /// Parses the PostgREST error shape when possible, otherwise wraps the
    /// raw body so the user still sees what the server said.
    pub fn from_status(status: u16, body: &str) -> Self {
        let body = body.trim();

        if let Ok(parsed) = serde_json::from_str::<ApiError>(body) {
            if !parsed.message.is_empty() {
                return parsed;
            }
        }

        if body.is_empty() {
            Self::message(format!("HTTP {status}"))
        } else {
            Self::message(format!("HTTP {status}: {body}"))
        }
    }

    /// Converts the error into an opaque JSON value for display and storage.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::String(self.message.clone()))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}
