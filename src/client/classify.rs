//! Maps failed responses and transport errors onto [`GitHubError`].
//!
//! This is the only place classified errors are constructed.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::transport::{HttpError, HttpResponse};
use crate::error::GitHubError;

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";

/// Classifies a non-2xx response.
///
/// `resource` names what was requested ("User", "Repository", ...) and ends up
/// in not-found messages.
pub fn classify_response(
    response: &HttpResponse,
    resource: &str,
    token_configured: bool,
) -> GitHubError {
    match response.status {
        401 => GitHubError::Unauthorized { token_configured },
        403 if response.header(RATE_LIMIT_REMAINING).map(str::trim) == Some("0") => {
            GitHubError::RateLimited {
                reset_at: rate_limit_reset(response),
            }
        }
        403 => GitHubError::Forbidden,
        404 => GitHubError::NotFound {
            resource: resource.to_string(),
        },
        status @ 500..=599 => GitHubError::ServerError { status },
        status => GitHubError::Unknown {
            status: Some(status),
            message: unknown_message(status, upstream_message(&response.body).as_deref()),
        },
    }
}

/// Classifies a failure that happened before any HTTP status was received.
pub fn classify_transport(error: &HttpError) -> GitHubError {
    match error {
        HttpError::Timeout(_) => GitHubError::Timeout,
        HttpError::Connect(_) => GitHubError::NetworkUnreachable,
        other => GitHubError::Unknown {
            status: None,
            message: format!("GitHub request failed: {}", other),
        },
    }
}

/// Classifies a 2xx response whose body could not be decoded.
pub fn classify_decode(status: u16, error: &serde_json::Error) -> GitHubError {
    GitHubError::Unknown {
        status: Some(status),
        message: format!("Unexpected response from GitHub: {}", error),
    }
}

/// Reads `x-ratelimit-reset` (epoch seconds).
fn rate_limit_reset(response: &HttpResponse) -> Option<DateTime<Utc>> {
    response
        .header(RATE_LIMIT_RESET)
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

/// The `message` field GitHub puts in error bodies, if any.
fn upstream_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn unknown_message(status: u16, upstream: Option<&str>) -> String {
    let base = match status {
        422 => "Invalid request parameters".to_string(),
        _ => format!("GitHub API error ({})", status),
    };
    match upstream {
        Some(detail) if !detail.is_empty() => format!("{}: {}", base, detail),
        _ => base,
    }
}
