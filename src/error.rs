//! Error types for the GitHub client and the HTTP API
//!
//! Provides the classified error taxonomy using thiserror.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Local, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::client::InvalidOption;

// == Error Kind ==
/// Stable, copyable discriminant of a [`GitHubError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unauthorized,
    RateLimited,
    NotFound,
    Forbidden,
    NetworkUnreachable,
    Timeout,
    ServerError,
    Unknown,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NetworkUnreachable => "network_unreachable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::ServerError => "server_error",
            ErrorKind::Unknown => "unknown",
        }
    }
}

// == GitHub Error Enum ==
/// A failed GitHub request, already classified.
///
/// Values are only built by the client's classification step
/// (`client::classify`); the `Display` output is meant for end users.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GitHubError {
    /// HTTP 401
    #[error("{}", unauthorized_message(*token_configured))]
    Unauthorized { token_configured: bool },

    /// HTTP 403 with an exhausted quota
    #[error("{}", rate_limited_message(reset_at))]
    RateLimited { reset_at: Option<DateTime<Utc>> },

    /// HTTP 404
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// HTTP 403 with quota remaining
    #[error("Access forbidden. You may need a GitHub token for this request.")]
    Forbidden,

    /// DNS or connection failure
    #[error("Network error. Please check your internet connection.")]
    NetworkUnreachable,

    /// The request exceeded the transport timeout
    #[error("Request timeout. Please try again.")]
    Timeout,

    /// HTTP 5xx
    #[error("{}", server_error_message(*status))]
    ServerError { status: u16 },

    /// Anything else
    #[error("{message}")]
    Unknown {
        status: Option<u16>,
        message: String,
    },
}

impl GitHubError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GitHubError::Unauthorized { .. } => ErrorKind::Unauthorized,
            GitHubError::RateLimited { .. } => ErrorKind::RateLimited,
            GitHubError::NotFound { .. } => ErrorKind::NotFound,
            GitHubError::Forbidden => ErrorKind::Forbidden,
            GitHubError::NetworkUnreachable => ErrorKind::NetworkUnreachable,
            GitHubError::Timeout => ErrorKind::Timeout,
            GitHubError::ServerError { .. } => ErrorKind::ServerError,
            GitHubError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// When the rate limit resets, if this is a rate-limit error and the reset is known.
    pub fn retry_after(&self) -> Option<DateTime<Utc>> {
        match self {
            GitHubError::RateLimited { reset_at } => *reset_at,
            _ => None,
        }
    }

    /// Access denial that some operations treat as "no data".
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            GitHubError::Forbidden | GitHubError::NotFound { .. }
        )
    }
}

fn unauthorized_message(token_configured: bool) -> &'static str {
    if token_configured {
        "Invalid GitHub token. Please check the GITHUB_TOKEN setting."
    } else {
        "GitHub token not configured. Please set GITHUB_TOKEN."
    }
}

fn rate_limited_message(reset_at: &Option<DateTime<Utc>>) -> String {
    match reset_at {
        Some(reset) => format!("Rate limit exceeded. Resets at {}", format_reset_time(reset)),
        None => "Rate limit exceeded.".to_string(),
    }
}

fn server_error_message(status: u16) -> String {
    match status {
        500 => "GitHub server error occurred".to_string(),
        502 => "GitHub service temporarily unavailable".to_string(),
        503 => "GitHub service unavailable".to_string(),
        other => format!("GitHub server error ({})", other),
    }
}

/// Formats a rate-limit reset instant as a local wall-clock time.
pub fn format_reset_time(reset: &DateTime<Utc>) -> String {
    reset.with_timezone(&Local).format("%H:%M:%S").to_string()
}

// == Result Type Alias ==
/// Convenience Result type for client operations.
pub type Result<T> = std::result::Result<T, GitHubError>;

// == App Error Enum ==
/// Error returned by the HTTP API handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid request data (rejected before any upstream call)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Classified upstream failure
    #[error(transparent)]
    GitHub(#[from] GitHubError),
}

impl From<InvalidOption> for AppError {
    fn from(err: InvalidOption) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::GitHub(err) => match err.kind() {
                ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
                ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Forbidden => StatusCode::FORBIDDEN,
                ErrorKind::NetworkUnreachable | ErrorKind::ServerError => StatusCode::BAD_GATEWAY,
                ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (kind, retry_after) = match &self {
            AppError::InvalidRequest(_) => ("invalid_request", None),
            AppError::GitHub(err) => (err.kind().as_str(), err.retry_after()),
        };

        let mut body = json!({
            "error": self.to_string(),
            "kind": kind,
        });
        if let Some(reset) = retry_after {
            body["retry_after"] = json!(reset.to_rfc3339());
        }

        let mut response = (status, Json(body)).into_response();

        if let Some(reset) = retry_after {
            let seconds = (reset - Utc::now()).num_seconds().max(0);
            if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

/// Convenience Result type for the HTTP API.
pub type AppResult<T> = std::result::Result<T, AppError>;
