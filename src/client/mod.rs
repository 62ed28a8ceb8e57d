//! Supabase API client layer.
//!
//! Provides a trait-based backend boundary so query execution can run
//! against the real PostgREST transport or an in-memory mock, plus the
//! factory that builds a fresh handle per run.

mod mock;
mod postgrest;
mod request;
mod types;

pub use mock::{FailingBackend, MockBackend};
pub use postgrest::{PostgrestBackend, DEFAULT_TIMEOUT_SECS};
pub use request::{Filter, FilterOp, OrderTerm, QueryRequest, RequestBuilder, Target, Verb};
pub use types::{ApiError, ApiResponse};

use crate::error::Result;
use async_trait::async_trait;

/// User-supplied project credentials.
///
/// Both values are opaque strings and are never validated for format; a
/// malformed URL only surfaces when a query performs I/O. Lifetime is the
/// current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`.
    pub base_url: String,
    /// API key sent as `apikey` and bearer token.
    pub key: String,
}

impl Credentials {
    /// Creates credentials from the given URL and key.
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            key: key.into(),
        }
    }

    /// Returns true when both values are present (non-blank).
    pub fn is_complete(&self) -> bool {
        !self.base_url.trim().is_empty() && !self.key.trim().is_empty()
    }
}

/// Creates a query backend for the given credentials.
///
/// This is the central factory: it is called fresh for every run with the
/// credentials snapshot taken at submission time, so credential edits take
/// effect on the next run with no invalidation logic.
pub fn connect(credentials: &Credentials, timeout_secs: u64) -> Result<Box<dyn QueryBackend>> {
    let backend = PostgrestBackend::new(credentials, timeout_secs)?;
    Ok(Box::new(backend))
}

/// Trait defining the backend boundary.
///
/// A backend executes one resolved query request and returns the
/// `{data, error}` envelope. Transport-level failures (no connection,
/// timeout, TLS) are `Err`; backend-reported rejections travel inside the
/// envelope.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Executes a query request against the project.
    async fn execute(&self, request: &QueryRequest) -> Result<ApiResponse>;
}
