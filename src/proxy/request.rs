//! Inbound request model and validation.
//!
//! # Responsibilities
//! - Extract the `url` query parameter and the `host` header
//! - Parse the target as an absolute http(s) URL
//! - Reject targets pointing back at this proxy's own host
//!
//! # Design Decisions
//! - Checks run in a fixed order and stop at the first failure
//! - Loop detection compares the immediate hostname only; chains through
//!   other proxies are not detected

use axum::http::{header, HeaderMap};
use url::Url;

use crate::proxy::error::ProxyError;

/// Name of the query parameter carrying the target URL.
pub const URL_PARAM: &str = "url";

/// The parts of an inbound request the handler looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyRequest {
    /// Raw (already percent-decoded) `url` query parameter.
    pub url: Option<String>,
    /// Inbound `host` header.
    pub host: Option<String>,
}

impl ProxyRequest {
    pub fn new(url: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            host: Some(host.into()),
        }
    }

    /// Build from a raw query string and the inbound headers.
    pub fn from_parts(query: Option<&str>, headers: &HeaderMap) -> Self {
        let url = query.and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == URL_PARAM)
                .map(|(_, value)| value.into_owned())
        });
        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self { url, host }
    }

    /// Run the validation sequence, returning the parsed target.
    pub fn validate(&self) -> Result<Url, ProxyError> {
        // 1. Presence
        let raw = match self.url.as_deref() {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(ProxyError::MissingUrl),
        };

        // 2. Format
        let target = Url::parse(raw).map_err(|_| ProxyError::InvalidUrl)?;
        if !matches!(target.scheme(), "http" | "https") {
            return Err(ProxyError::InvalidUrl);
        }
        let hostname = match target.host_str() {
            Some(h) if !h.is_empty() => h,
            _ => return Err(ProxyError::InvalidUrl),
        };

        // 3. Self-loop
        if let Some(host) = self.host.as_deref() {
            if hostname.eq_ignore_ascii_case(host) {
                return Err(ProxyError::SelfLoop);
            }
        }

        Ok(target)
    }
}

/// `Referer` value for a target: its origin (scheme + host + port).
pub fn referer_for(target: &Url) -> String {
    target.origin().ascii_serialization()
}
