//! Configuration Module
//!
//! Handles loading the GitHub credential and server settings from environment variables.

use std::env;

/// Upstream GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Value shipped in example env files; treated the same as an unset token.
pub const TOKEN_PLACEHOLDER: &str = "your_github_personal_access_token_here";

/// Time-to-live of cached responses, in seconds.
pub const DEFAULT_CACHE_TTL: u64 = 300;

/// Per-request timeout enforced by the transport, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client and server configuration.
///
/// The token is configuration, not state: it is read once and never refreshed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer credential, already normalized (see [`normalize_token`])
    pub github_token: Option<String>,
    /// Base URL of the GitHub REST API
    pub api_base_url: String,
    /// TTL in seconds applied uniformly to every cached response
    pub cache_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `GITHUB_TOKEN` - Personal access token (default: none, unauthenticated)
    /// - `GITHUB_API_URL` - API base URL (default: https://api.github.com)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    ///
    /// The cache TTL is not read from the environment.
    pub fn from_env() -> Self {
        Self {
            github_token: env::var("GITHUB_TOKEN")
                .ok()
                .and_then(|v| normalize_token(&v)),
            api_base_url: env::var("GITHUB_API_URL")
                .ok()
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            cache_ttl: DEFAULT_CACHE_TTL,
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
        }
    }

    /// Returns a copy of this config carrying the given token.
    pub fn with_token(mut self, token: &str) -> Self {
        self.github_token = normalize_token(token);
        self
    }

    /// Whether a usable credential is configured.
    pub fn has_token(&self) -> bool {
        self.github_token.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            api_base_url: DEFAULT_API_URL.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            server_port: 3000,
        }
    }
}

/// Returns the trimmed token, or `None` when it is blank or the placeholder.
pub fn normalize_token(raw: &str) -> Option<String> {
    let token = raw.trim();
    if token.is_empty() || token == TOKEN_PLACEHOLDER {
        None
    } else {
        Some(token.to_string())
    }
}
