//! Outbound fetch to the origin server.
//!
//! # Responsibilities
//! - Issue exactly one GET per inbound request
//! - Present a browser identity and a same-origin `Referer`
//! - Classify the origin's answer and buffer the body
//!
//! # Design Decisions
//! - No caller headers are forwarded (cookies, auth stay with the caller)
//! - No retries; a failure is reported as-is
//! - Settings are plain values handed in at construction

use std::time::Duration;

use axum::body::Bytes;
use reqwest::header::{CONTENT_TYPE, REFERER, USER_AGENT};
use url::Url;

use crate::config::schema::DEFAULT_USER_AGENT;
use crate::config::{CacheConfig, ProxyConfig};
use crate::proxy::error::ProxyError;
use crate::proxy::request::referer_for;
use crate::proxy::response::{ProxiedImage, FALLBACK_CONTENT_TYPE};

/// Values the fetcher stamps onto requests and responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    pub user_agent: String,
    pub cache_control: String,
    pub fallback_content_type: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_control: CacheConfig::default().header_value(),
            fallback_content_type: FALLBACK_CONTENT_TYPE.to_string(),
        }
    }
}

impl FetchSettings {
    pub fn from_config(config: &ProxyConfig) -> Self {
        Self {
            user_agent: config.fetch.user_agent.clone(),
            cache_control: config.cache.header_value(),
            fallback_content_type: FALLBACK_CONTENT_TYPE.to_string(),
        }
    }
}

/// What the origin sent back on success.
#[derive(Debug)]
pub struct FetchedImage {
    pub content_type: Option<String>,
    pub body: Bytes,
}

/// Fetches images from origin servers.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ImageFetcher {
    pub fn new(client: reqwest::Client, settings: FetchSettings) -> Self {
        Self { client, settings }
    }

    /// Build the client and settings described by `config`.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(config)?;
        Ok(Self::new(client, FetchSettings::from_config(config)))
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    /// Fetch `target` and package it for relay.
    pub async fn fetch(&self, target: &Url) -> Result<ProxiedImage, ProxyError> {
        let fetched = self.get(target).await?;

        Ok(ProxiedImage {
            content_type: fetched
                .content_type
                .unwrap_or_else(|| self.settings.fallback_content_type.clone()),
            cache_control: self.settings.cache_control.clone(),
            body: fetched.body,
        })
    }

    async fn get(&self, target: &Url) -> Result<FetchedImage, ProxyError> {
        let response = self
            .client
            .get(target.clone())
            .header(REFERER, referer_for(target))
            .header(USER_AGENT, &self.settings.user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::upstream(status));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        let body = response.bytes().await?;

        Ok(FetchedImage { content_type, body })
    }
}

/// Build the outbound HTTP client.
pub fn build_client(config: &ProxyConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(config.timeouts.connect_secs));

    if let Some(secs) = config.fetch.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    if !config.fetch.system_proxy {
        builder = builder.no_proxy();
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = FetchSettings::default();
        assert!(settings.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(settings.cache_control, "public, max-age=31536000, immutable");
        assert_eq!(settings.fallback_content_type, "application/octet-stream");
    }

    #[test]
    fn test_settings_follow_config() {
        let mut config = ProxyConfig::default();
        config.fetch.user_agent = "TestAgent/1.0".into();
        config.cache.max_age_secs = 60;
        config.cache.immutable = false;

        let settings = FetchSettings::from_config(&config);
        assert_eq!(settings.user_agent, "TestAgent/1.0");
        assert_eq!(settings.cache_control, "public, max-age=60");
    }
}
