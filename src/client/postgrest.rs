//! PostgREST transport for the Supabase API.
//!
//! Translates a `QueryRequest` into the HTTP call the hosted API expects
//! and folds the response back into the `{data, error}` envelope.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::request::{QueryRequest, Target, Verb};
use super::types::{ApiError, ApiResponse};
use super::{Credentials, QueryBackend};
use crate::error::{PlayError, Result};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Path prefix of the REST interface on every Supabase project.
const REST_PATH: [&str; 2] = ["rest", "v1"];

/// HTTP backend speaking PostgREST to one project.
///
/// Construction performs no network I/O; a bad project URL only surfaces
/// when a request is executed.
#[derive(Debug, Clone)]
pub struct PostgrestBackend {
    http: Client,
    base_url: String,
    key: String,
}

impl PostgrestBackend {
    /// Creates a backend for the given credentials.
    pub fn new(credentials: &Credentials, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PlayError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: credentials.base_url.trim().to_string(),
            key: credentials.key.trim().to_string(),
        })
    }

    /// Builds the endpoint URL for a request, filters and modifiers included.
    fn endpoint(&self, request: &QueryRequest) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| PlayError::api(format!("Invalid project URL '{}': {e}", self.base_url)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| PlayError::api(format!("Invalid project URL '{}'", self.base_url)))?;
            segments.pop_if_empty();
            segments.extend(REST_PATH);
            match &request.target {
                Target::Table(table) => {
                    segments.push(table);
                }
                Target::Rpc { function, .. } => {
                    segments.push("rpc");
                    segments.push(function);
                }
            }
        }

        {
            let mut pairs = url.query_pairs_mut();
            if let Some(columns) = &request.columns {
                pairs.append_pair("select", columns);
            }
            for filter in &request.filters {
                pairs.append_pair(&filter.column, &filter.rhs());
            }
            if !request.order.is_empty() {
                let rendered: Vec<String> =
                    request.order.iter().map(|term| term.render()).collect();
                pairs.append_pair("order", &rendered.join(","));
            }
            if let Some(limit) = request.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
            if let Some(offset) = request.offset {
                pairs.append_pair("offset", &offset.to_string());
            }
        }

        // An empty query string renders as a trailing '?'; drop it.
        if url.query() == Some("") {
            url.set_query(None);
        }

        Ok(url)
    }

    /// Assembles the `Prefer` header for a request, if any is needed.
    fn prefer_header(request: &QueryRequest) -> Option<String> {
        let mut parts = Vec::new();

        if request.verb.is_mutation() {
            if request.returning {
                parts.push("return=representation");
            } else {
                parts.push("return=minimal");
            }
        }
        if request.verb == Verb::Upsert {
            parts.push("resolution=merge-duplicates");
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(","))
        }
    }

    /// Maps a transport failure to a descriptive API error.
    fn transport_error(e: reqwest::Error) -> PlayError {
        if e.is_timeout() {
            PlayError::api("Request timed out")
        } else if e.is_connect() {
            PlayError::api(format!("Failed to connect to the project: {e}"))
        } else {
            PlayError::api(format!("Request failed: {e}"))
        }
    }
}

#[async_trait]
impl QueryBackend for PostgrestBackend {
    async fn execute(&self, request: &QueryRequest) -> Result<ApiResponse> {
        let url = self.endpoint(request)?;

        let mut builder = match request.verb {
            Verb::Select => self.http.get(url),
            Verb::Insert | Verb::Upsert | Verb::Rpc => self.http.post(url),
            Verb::Update => self.http.patch(url),
            Verb::Delete => self.http.delete(url),
        };

        builder = builder
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header(CONTENT_TYPE, "application/json");

        if let Some(prefer) = Self::prefer_header(request) {
            builder = builder.header("Prefer", prefer);
        }
        if request.single {
            builder = builder.header(ACCEPT, "application/vnd.pgrst.object+json");
        } else {
            builder = builder.header(ACCEPT, "application/json");
        }

        match (&request.target, request.verb) {
            (Target::Rpc { args, .. }, _) => {
                builder = builder.json(args);
            }
            (_, verb) if verb.is_mutation() && verb != Verb::Delete => {
                let payload = request.payload.clone().unwrap_or(Value::Null);
                builder = builder.json(&payload);
            }
            _ => {}
        }

        let response = builder.send().await.map_err(Self::transport_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlayError::api(format!("Failed to read response: {e}")))?;

        if status.is_success() {
            let data = if body.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&body).unwrap_or(Value::String(body))
            };
            Ok(ApiResponse::success(data))
        } else {
            Ok(ApiResponse::failure(ApiError::from_status(
                status.as_u16(),
                &body,
            )))
        }
    }
}
