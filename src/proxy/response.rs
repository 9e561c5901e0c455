//! Outbound response construction.
//!
//! # Responsibilities
//! - Hold a successfully fetched image with its relay headers
//! - Render it as a binary HTTP response
//! - Render any outcome in the text-framed function envelope (base64 body)

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::proxy::error::ProxyError;

/// Content type used when the origin does not report one.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A fetched image ready to be relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedImage {
    pub content_type: String,
    pub cache_control: String,
    pub body: Bytes,
}

impl IntoResponse for ProxiedImage {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_CONTENT_TYPE));

        let mut response = (StatusCode::OK, self.body).into_response();
        let headers = response.headers_mut();
        headers.insert(header::CONTENT_TYPE, content_type);
        if let Ok(cache_control) = HeaderValue::from_str(&self.cache_control) {
            headers.insert(header::CACHE_CONTROL, cache_control);
        }
        response
    }
}

/// Response framing for text-only transports (serverless function style).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl FunctionResponse {
    /// Frame a handler outcome.
    pub fn from_result(result: Result<ProxiedImage, ProxyError>) -> Self {
        match result {
            Ok(image) => Self::from(image),
            Err(err) => Self::from(err),
        }
    }

    /// Raw body bytes, undoing base64 framing when present.
    pub fn decode_body(&self) -> Result<Vec<u8>, base64::DecodeError> {
        if self.is_base64_encoded {
            STANDARD.decode(&self.body)
        } else {
            Ok(self.body.clone().into_bytes())
        }
    }
}

impl From<ProxiedImage> for FunctionResponse {
    fn from(image: ProxiedImage) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), image.content_type);
        headers.insert("Cache-Control".to_string(), image.cache_control);

        Self {
            status_code: StatusCode::OK.as_u16(),
            headers,
            body: STANDARD.encode(&image.body),
            is_base64_encoded: true,
        }
    }
}

impl From<ProxyError> for FunctionResponse {
    fn from(err: ProxyError) -> Self {
        Self {
            status_code: err.status().as_u16(),
            headers: BTreeMap::new(),
            body: err.to_string(),
            is_base64_encoded: false,
        }
    }
}
