//! The proxy handler.
//!
//! `handle` is the whole request lifecycle: validate, fetch once, relay.
//! `proxy_handler` adapts it to axum and records logs and metrics.

use std::time::Instant;

use axum::{
    extract::{RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};

use crate::http::request::request_id;
use crate::observability::metrics;
use crate::proxy::error::ProxyError;
use crate::proxy::fetch::ImageFetcher;
use crate::proxy::request::ProxyRequest;
use crate::proxy::response::{FunctionResponse, ProxiedImage};

/// Validate `request` and relay the image it points at.
pub async fn handle(
    fetcher: &ImageFetcher,
    request: &ProxyRequest,
) -> Result<ProxiedImage, ProxyError> {
    let target = request.validate()?;
    fetcher.fetch(&target).await
}

/// Run the handler once and frame the outcome for a text-only transport.
pub async fn invoke(fetcher: &ImageFetcher, request: &ProxyRequest) -> FunctionResponse {
    FunctionResponse::from_result(handle(fetcher, request).await)
}

/// Axum entry point for the proxy route.
pub async fn proxy_handler(
    State(fetcher): State<ImageFetcher>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&headers);
    let request = ProxyRequest::from_parts(query.as_deref(), &headers);

    tracing::debug!(
        request_id = %request_id,
        url = request.url.as_deref().unwrap_or_default(),
        "Proxying image"
    );

    match handle(&fetcher, &request).await {
        Ok(image) => {
            tracing::info!(
                request_id = %request_id,
                url = request.url.as_deref().unwrap_or_default(),
                content_type = %image.content_type,
                bytes = image.body.len(),
                "Image relayed"
            );
            metrics::record_upstream_bytes(image.body.len());
            metrics::record_request(200, "ok", start_time);
            image.into_response()
        }
        Err(err) => {
            let status = err.status().as_u16();
            match &err {
                ProxyError::Upstream { .. } => tracing::warn!(
                    request_id = %request_id,
                    url = request.url.as_deref().unwrap_or_default(),
                    status,
                    "Origin rejected request"
                ),
                ProxyError::Transport(_) => tracing::error!(
                    request_id = %request_id,
                    url = request.url.as_deref().unwrap_or_default(),
                    error = %err,
                    "Origin fetch failed"
                ),
                _ => tracing::debug!(
                    request_id = %request_id,
                    error = %err,
                    "Rejected proxy request"
                ),
            }
            metrics::record_request(status, err.kind(), start_time);
            err.into_response()
        }
    }
}
