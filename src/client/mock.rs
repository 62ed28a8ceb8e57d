//! Mock query backends for testing.
//!
//! `MockBackend` answers with scripted responses and records every request
//! it sees; `FailingBackend` fails at the transport level, the way a dead
//! network would.

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::request::QueryRequest;
use super::types::{ApiError, ApiResponse};
use super::QueryBackend;
use crate::error::{PlayError, Result};

/// A backend that returns scripted responses in order.
///
/// When the script runs out it answers with an empty successful result.
pub struct MockBackend {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<QueryRequest>>,
}

impl MockBackend {
    /// Creates a backend with no scripted responses.
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Creates a backend that plays back the given responses in order.
    pub fn with_responses(responses: Vec<ApiResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a backend that answers every request with a backend error.
    pub fn rejecting(error: ApiError) -> Self {
        Self::with_responses(vec![ApiResponse::failure(error)])
    }

    /// Queues another scripted response.
    pub fn push_response(&self, response: ApiResponse) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
    }

    /// Returns the requests executed so far.
    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryBackend for MockBackend {
    async fn execute(&self, request: &QueryRequest) -> Result<ApiResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let scripted = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());

        Ok(scripted.unwrap_or_else(|| ApiResponse::success(json!([]))))
    }
}

/// A backend whose every request fails at the transport level.
pub struct FailingBackend {
    message: String,
}

impl FailingBackend {
    /// Creates a failing backend with the given transport error message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl QueryBackend for FailingBackend {
    async fn execute(&self, _request: &QueryRequest) -> Result<ApiResponse> {
        Err(PlayError::api(self.message.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::request::RequestBuilder;

    fn select_users() -> QueryRequest {
        let mut builder = RequestBuilder::table("users");
        builder.select(None).unwrap();
        builder.build().unwrap()
    }

    #[tokio::test]
    async fn test_mock_scripted_responses_in_order() {
        let backend = MockBackend::with_responses(vec![
            ApiResponse::success(json!([{"id": 1}])),
            ApiResponse::failure(ApiError::message("nope")),
        ]);

        let first = backend.execute(&select_users()).await.unwrap();
        assert_eq!(first.data, json!([{"id": 1}]));

        let second = backend.execute(&select_users()).await.unwrap();
        assert!(second.is_error());
    }

    #[tokio::test]
    async fn test_mock_default_response() {
        let backend = MockBackend::new();
        let response = backend.execute(&select_users()).await.unwrap();
        assert!(!response.is_error());
        assert_eq!(response.data, json!([]));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let backend = MockBackend::new();
        backend.execute(&select_users()).await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0], select_users());
    }

    #[tokio::test]
    async fn test_failing_backend() {
        let backend = FailingBackend::new("connection reset");
        let err = backend.execute(&select_users()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
    }
}
