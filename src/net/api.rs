//! HTTP client for the answering service.
//!
//! DESIGN
//! ======
//! `AnswerService` is the seam the conversation store and session bootstrap
//! depend on; `ApiClient` is the reqwest implementation. The client is
//! stateless apart from the configured base URL and timeout, so one instance
//! is shared behind an `Arc` for the whole session.
//!
//! ERROR HANDLING
//! ==============
//! Each operation funnels through `get_json` / `post_json`, which map every
//! failure to the operation's `ApiError` variant via `net::error::normalize`.
//! Transport details are logged at debug level only.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::{ApiError, Operation, normalize};
use super::types::{DatasetSearch, QueryRequest, QueryResponse, Stats};
use crate::config::ClientConfig;

pub(crate) const HEALTH_PATH: &str = "/";
pub(crate) const QUERY_PATH: &str = "/api/query";
pub(crate) const STATS_PATH: &str = "/api/stats";
pub(crate) const INDEX_PATH: &str = "/api/index";
pub(crate) const SEARCH_PATH: &str = "/api/search_datasets";

// =============================================================================
// SERVICE TRAIT
// =============================================================================

/// Remote operations offered by the answering service.
#[async_trait::async_trait]
pub trait AnswerService: Send + Sync {
    /// Probe reachability. Fails with [`ApiError::Connectivity`].
    async fn health_check(&self) -> Result<serde_json::Value, ApiError>;

    /// Ask a natural-language question. Fails with [`ApiError::Query`].
    async fn submit_query(&self, text: &str) -> Result<QueryResponse, ApiError>;

    /// Fetch aggregate statistics. Fails with [`ApiError::Stats`].
    async fn get_stats(&self) -> Result<Stats, ApiError>;

    /// Ask the backend to re-index its data. Fails with [`ApiError::Index`].
    async fn trigger_indexing(&self) -> Result<serde_json::Value, ApiError>;

    /// Search the upstream dataset catalogue. Fails with [`ApiError::Search`].
    async fn search_datasets(&self, text: &str) -> Result<DatasetSearch, ApiError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Build a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, op: Operation, path: &str) -> Result<T, ApiError> {
        execute(op, self.http.get(self.config.endpoint(path))).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        op: Operation,
        path: &str,
        body: Option<&QueryRequest<'_>>,
    ) -> Result<T, ApiError> {
        let mut request = self.http.post(self.config.endpoint(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        execute(op, request).await
    }
}

async fn execute<T: DeserializeOwned>(op: Operation, request: reqwest::RequestBuilder) -> Result<T, ApiError> {
    let response = request.send().await.map_err(|e| {
        debug!(?op, error = %e, timeout = e.is_timeout(), "request failed");
        op.fallback_error()
    })?;

    let status = response.status();
    let text = response.text().await.map_err(|e| {
        debug!(?op, error = %e, "response body read failed");
        op.fallback_error()
    })?;

    if !status.is_success() {
        debug!(?op, status = status.as_u16(), "non-success response");
        return Err(normalize(op, &text));
    }

    parse_body(op, &text)
}

fn parse_body<T: DeserializeOwned>(op: Operation, text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| {
        debug!(?op, error = %e, "response parse failed");
        op.fallback_error()
    })
}

#[async_trait::async_trait]
impl AnswerService for ApiClient {
    async fn health_check(&self) -> Result<serde_json::Value, ApiError> {
        self.get_json(Operation::HealthCheck, HEALTH_PATH).await
    }

    async fn submit_query(&self, text: &str) -> Result<QueryResponse, ApiError> {
        self.post_json(Operation::SubmitQuery, QUERY_PATH, Some(&QueryRequest { query: text })).await
    }

    async fn get_stats(&self) -> Result<Stats, ApiError> {
        self.get_json(Operation::GetStats, STATS_PATH).await
    }

    async fn trigger_indexing(&self) -> Result<serde_json::Value, ApiError> {
        self.post_json(Operation::TriggerIndexing, INDEX_PATH, None).await
    }

    async fn search_datasets(&self, text: &str) -> Result<DatasetSearch, ApiError> {
        self.post_json(Operation::SearchDatasets, SEARCH_PATH, Some(&QueryRequest { query: text })).await
    }
}
