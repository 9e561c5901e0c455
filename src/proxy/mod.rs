//! Image proxy subsystem.
//!
//! # Data Flow
//! ```text
//! GET /proxy?url=<target>
//!     → request.rs (extract url + host, validate, loop check)
//!     → fetch.rs (one GET to origin with Referer + User-Agent)
//!     → response.rs (200 + Content-Type + Cache-Control, raw bytes)
//!     → error.rs (400 / upstream status / 500 on any failure)
//! ```
//!
//! # Design Decisions
//! - Stateless: nothing survives a request
//! - No retries, no internal caching, no streaming
//! - Failures are values (`ProxyError`), rendered to HTTP only at the edge

pub mod error;
pub mod fetch;
pub mod handler;
pub mod request;
pub mod response;

pub use error::ProxyError;
pub use fetch::{FetchSettings, ImageFetcher};
pub use handler::{handle, invoke, proxy_handler};
pub use request::ProxyRequest;
pub use response::{FunctionResponse, ProxiedImage};
