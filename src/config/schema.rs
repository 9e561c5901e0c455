//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the image proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Browser identity presented to origin servers.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// One year, in seconds.
pub const DEFAULT_CACHE_MAX_AGE_SECS: u64 = 31_536_000;

/// Root configuration for the image proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Proxy endpoint settings.
    pub proxy: EndpointConfig,

    /// Outbound fetch settings.
    pub fetch: FetchConfig,

    /// Cache headers attached to relayed images.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Where the proxy handler is mounted.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Route path for the proxy handler (e.g., "/proxy").
    pub route_path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            route_path: "/proxy".to_string(),
        }
    }
}

/// Outbound fetch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent sent to origin servers.
    pub user_agent: String,

    /// Honor HTTP(S)_PROXY environment variables for outbound requests.
    pub system_proxy: bool,

    /// Overall fetch timeout in seconds. Unset means the client imposes none.
    pub timeout_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            system_proxy: true,
            timeout_secs: None,
        }
    }
}

/// Cache-Control settings for successful responses.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `max-age` directive in seconds.
    pub max_age_secs: u64,

    /// Append the `immutable` directive.
    pub immutable: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: DEFAULT_CACHE_MAX_AGE_SECS,
            immutable: true,
        }
    }
}

impl CacheConfig {
    /// Render the `Cache-Control` header value.
    pub fn header_value(&self) -> String {
        let mut value = format!("public, max-age={}", self.max_age_secs);
        if self.immutable {
            value.push_str(", immutable");
        }
        value
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout for origin fetches, in seconds.
    pub connect_secs: u64,

    /// Deadline for a whole inbound request/response, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 60,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
