//! Image proxy library.
//!
//! Fetches remote images server-side and relays them with browser-friendly
//! headers. See [`proxy::handle`] for the request lifecycle.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use proxy::{handle, ImageFetcher, ProxyError, ProxyRequest};
