//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_API_TIMEOUT_MS: u64 = 30_000;

pub const API_URL_VAR: &str = "SAMARTH_API_URL";
pub const API_TIMEOUT_VAR: &str = "SAMARTH_API_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the answering service, without a trailing slash.
    pub api_url: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_API_URL.to_owned(), timeout_ms: DEFAULT_API_TIMEOUT_MS }
    }
}

impl ClientConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `SAMARTH_API_URL`: default `http://localhost:5000`
    /// - `SAMARTH_API_TIMEOUT_MS`: default 30000; unparseable or zero values fall back
    #[must_use]
    pub fn from_env() -> Self {
        let api_url = std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        Self::new(&api_url, env_parse_u64(API_TIMEOUT_VAR, DEFAULT_API_TIMEOUT_MS))
    }

    /// Normalize an explicit URL/timeout pair.
    #[must_use]
    pub fn new(api_url: &str, timeout_ms: u64) -> Self {
        let trimmed = api_url.trim().trim_end_matches('/');
        let api_url = if trimmed.is_empty() { DEFAULT_API_URL.to_owned() } else { trimmed.to_owned() };
        let timeout_ms = if timeout_ms == 0 { DEFAULT_API_TIMEOUT_MS } else { timeout_ms };
        Self { api_url, timeout_ms }
    }

    /// Apply command-line overrides on top of this config. Blank URLs and
    /// zero timeouts fall back the same way `new` does.
    #[must_use]
    pub fn with_overrides(self, api_url: Option<&str>, timeout_ms: Option<u64>) -> Self {
        Self::new(api_url.unwrap_or(self.api_url.as_str()), timeout_ms.unwrap_or(self.timeout_ms))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Absolute URL for a backend path such as `/api/query`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}
