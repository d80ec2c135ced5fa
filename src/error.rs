//! Error types
//!
//! Every fallible SDK call returns [`Error`]. A 404 on a targeted request is
//! surfaced as [`Error::NotFound`] so callers can match on it; every other
//! non-2xx status keeps its code and body for diagnostics.

use crate::openstack::http::sanitize_for_log;
use serde_json::Value;
use thiserror::Error;

/// Result alias used across the SDK
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised by the block storage client.
#[derive(Debug, Error)]
pub enum Error {
    /// The server answered 404 for the requested URL.
    #[error("resource not found: {url}")]
    NotFound {
        /// URL that was requested.
        url: String,
    },
    /// The server answered with any other non-success status.
    #[error("request failed with status {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// The caller omitted a required value or passed an unsupported one.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// The configured endpoint or a continuation link is not a valid URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// HTTP status code carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Reason the server gave in an error body
///
/// Cinder nests it as `{"badRequest": {"message": ..}}`, EVS as
/// `{"error": {"message": ..}}` or a top-level `error_msg`. Anything else
/// falls back to the sanitized raw body.
fn server_reason(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }
    let reason = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ["message", "error_msg"]
            .iter()
            .find_map(|k| map.get(*k).and_then(Value::as_str))
            .or_else(|| {
                map.values()
                    .find_map(|v| v.get("message").and_then(Value::as_str))
            })
            .map(str::to_string),
        _ => None,
    };
    let reason = sanitize_for_log(reason.as_deref().unwrap_or(body));
    (!reason.trim().is_empty()).then_some(reason)
}

/// Format an SDK error for display in a terminal
///
/// Client errors carry the server's reason so a rejected request says why.
pub fn format_error(error: &Error) -> String {
    let summary = summarize(error);
    match error {
        Error::Http { status, body } if *status < 500 => match server_reason(body) {
            Some(reason) => format!("{} {}", summary, reason),
            None => summary,
        },
        _ => summary,
    }
}

fn summarize(error: &Error) -> String {
    match error.status() {
        Some(401) => "Authentication failed. Check OS_AUTH_TOKEN.".to_string(),
        Some(403) => "Permission denied for this project.".to_string(),
        Some(404) => "Resource not found.".to_string(),
        Some(409) => "Resource conflict. The resource may be in use or in a transitional state."
            .to_string(),
        Some(413) | Some(429) => "Rate or quota limit exceeded. Please try again later.".to_string(),
        Some(400) => "Invalid request. Check your parameters.".to_string(),
        Some(status) if status >= 500 => {
            "Block storage service temporarily unavailable. Please try again.".to_string()
        }
        Some(status) => format!("Request failed with status {}.", status),
        None => match error {
            Error::InvalidArgument(msg) => format!("Invalid argument: {}", msg),
            Error::Transport(_) => {
                "Request failed. Check your network connection and endpoint.".to_string()
            }
            Error::Decode(_) => "Unexpected response from the server.".to_string(),
            Error::Url(err) => format!("Invalid endpoint URL: {}", err),
            Error::NotFound { .. } | Error::Http { .. } => "Request failed.".to_string(),
        },
    }
}
