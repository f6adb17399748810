//! Backend configuration.

use notarium_core::defaults;
use tracing::info;

/// Connection settings for the note service.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL including the `/api` prefix.
    pub base_url: String,
    /// Bearer token attached to every request when present.
    pub token: Option<String>,
    /// Timeout for ordinary requests (seconds).
    pub timeout_secs: u64,
    /// Timeout for pillar generation requests (seconds).
    pub pillar_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            token: None,
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            pillar_timeout_secs: defaults::PILLAR_TIMEOUT_SECS,
        }
    }
}

impl BackendConfig {
    /// Configuration pointing at the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: trim_trailing_slash(base_url.into()),
            ..Default::default()
        }
    }

    /// Create from environment variables.
    ///
    /// - `NOTARIUM_BASE_URL`: base URL (default `http://localhost:8001/api`)
    /// - `NOTARIUM_API_TOKEN`: bearer token (optional)
    /// - `NOTARIUM_TIMEOUT_SECS`: request timeout override
    /// - `NOTARIUM_PILLAR_TIMEOUT_SECS`: pillar timeout override
    pub fn from_env() -> Self {
        let base_url = std::env::var("NOTARIUM_BASE_URL")
            .map(trim_trailing_slash)
            .unwrap_or_else(|_| defaults::BASE_URL.to_string());
        let token = std::env::var("NOTARIUM_API_TOKEN").ok().filter(|t| !t.is_empty());
        let timeout_secs = std::env::var("NOTARIUM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::REQUEST_TIMEOUT_SECS);
        let pillar_timeout_secs = std::env::var("NOTARIUM_PILLAR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults::PILLAR_TIMEOUT_SECS);

        info!(
            base_url = %base_url,
            has_token = token.is_some(),
            timeout_secs,
            "Backend configuration loaded"
        );

        Self {
            base_url,
            token,
            timeout_secs,
            pillar_timeout_secs,
        }
    }

    /// Set the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Override the request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn trim_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}
