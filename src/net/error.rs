//! Error taxonomy for the answering service boundary.
//!
//! ERROR HANDLING
//! ==============
//! Every variant carries only a human-readable message: either the `error`
//! string the backend put in its JSON body, or a fixed per-operation
//! fallback. Transport internals (reqwest errors, timeouts, decode failures)
//! are logged where they happen and never reach callers.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Remote operations exposed by the answering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    HealthCheck,
    SubmitQuery,
    GetStats,
    TriggerIndexing,
    SearchDatasets,
}

impl Operation {
    /// Message used when the backend gives no structured `error` string.
    #[must_use]
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::HealthCheck => "Failed to connect to server",
            Self::SubmitQuery => "Failed to process query",
            Self::GetStats => "Failed to get statistics",
            Self::TriggerIndexing => "Failed to index data",
            Self::SearchDatasets => "Failed to search datasets",
        }
    }

    /// Wrap a normalized message in the variant that belongs to this operation.
    #[must_use]
    pub fn error(self, message: impl Into<String>) -> ApiError {
        let message = message.into();
        match self {
            Self::HealthCheck => ApiError::Connectivity(message),
            Self::SubmitQuery => ApiError::Query(message),
            Self::GetStats => ApiError::Stats(message),
            Self::TriggerIndexing => ApiError::Index(message),
            Self::SearchDatasets => ApiError::Search(message),
        }
    }

    /// Error carrying this operation's fallback message.
    #[must_use]
    pub fn fallback_error(self) -> ApiError {
        self.error(self.fallback_message())
    }
}

/// Errors produced by [`crate::net::api::AnswerService`] operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Health check failed; downgrades the connectivity indicator.
    #[error("{0}")]
    Connectivity(String),

    /// Query submission failed; surfaces as an in-transcript error message.
    #[error("{0}")]
    Query(String),

    /// Statistics fetch failed; the statistics display stays stale.
    #[error("{0}")]
    Stats(String),

    /// Indexing trigger failed.
    #[error("{0}")]
    Index(String),

    /// Dataset search failed.
    #[error("{0}")]
    Search(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// The human-readable message without any variant prefix.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Connectivity(m)
            | Self::Query(m)
            | Self::Stats(m)
            | Self::Index(m)
            | Self::Search(m)
            | Self::HttpClientBuild(m) => m,
        }
    }
}

/// Pull the backend's `error` string out of a response body.
///
/// Returns `None` for non-JSON bodies, bodies without an `error` key, and
/// `error` values that are not non-empty strings.
#[must_use]
pub fn remote_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).unwrap_or_default();
    value
        .get("error")
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

/// Normalize a failed response body into the operation's error variant.
#[must_use]
pub fn normalize(op: Operation, body: &str) -> ApiError {
    match remote_error_message(body) {
        Some(message) => op.error(message),
        None => op.fallback_error(),
    }
}
