//! Failure taxonomy of the proxy handler.
//!
//! Every failure is terminal for its request and maps to exactly one HTTP
//! response; `Display` renders the response body.

use std::error::Error as StdError;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors produced while validating, fetching or relaying an image.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// No `url` query parameter, or an empty one.
    #[error("Missing \"url\" parameter")]
    MissingUrl,

    /// `url` is not an absolute http(s) URL with a host.
    #[error("Invalid URL format.")]
    InvalidUrl,

    /// Target hostname equals the inbound `host` header.
    #[error("Cannot proxy to self to prevent infinite loops.")]
    SelfLoop,

    /// Origin answered outside the 2xx range.
    #[error("Failed to fetch image: {reason}")]
    Upstream { status: StatusCode, reason: String },

    /// Network, timeout or body read failure.
    #[error("Internal Server Error: {}", error_chain(.0))]
    Transport(#[from] reqwest::Error),
}

impl ProxyError {
    /// Build an upstream error carrying the origin's status.
    pub fn upstream(status: StatusCode) -> Self {
        ProxyError::Upstream {
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    }

    /// HTTP status returned to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingUrl | ProxyError::InvalidUrl | ProxyError::SelfLoop => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::Upstream { status, .. } => *status,
            ProxyError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::MissingUrl => "missing_url",
            ProxyError::InvalidUrl => "invalid_url",
            ProxyError::SelfLoop => "self_loop",
            ProxyError::Upstream { .. } => "upstream",
            ProxyError::Transport(_) => "transport",
        }
    }

    /// Caller-side input problem (the 400 family).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProxyError::MissingUrl | ProxyError::InvalidUrl | ProxyError::SelfLoop
        )
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Render an error followed by its sources, joined by ": ".
fn error_chain(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
