//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, route path and header values
//! - Validate value ranges (timeouts > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::config::schema::ProxyConfig;
use crate::http::server::HEALTH_PATH;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("proxy.route_path: '{0}' must start with '/'")]
    RelativeRoutePath(String),

    #[error("proxy.route_path: '{0}' collides with the health endpoint")]
    ReservedRoutePath(String),

    #[error("proxy.route_path: '{0}' is not a routable path (no ':' or '*' segments, balanced braces)")]
    UnroutablePath(String),

    #[error("fetch.user_agent: must be a non-empty header value")]
    InvalidUserAgent,

    #[error("{0}: must be greater than zero")]
    ZeroTimeout(&'static str),
}

/// Check a parsed configuration, collecting every problem.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let route_path = &config.proxy.route_path;
    if !route_path.starts_with('/') {
        errors.push(ValidationError::RelativeRoutePath(route_path.clone()));
    } else if route_path == HEALTH_PATH {
        errors.push(ValidationError::ReservedRoutePath(route_path.clone()));
    } else if !is_routable(route_path) {
        errors.push(ValidationError::UnroutablePath(route_path.clone()));
    }

    let user_agent = config.fetch.user_agent.trim();
    if user_agent.is_empty() || HeaderValue::from_str(user_agent).is_err() {
        errors.push(ValidationError::InvalidUserAgent);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    }
    if config.fetch.timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroTimeout("fetch.timeout_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Path syntax the router accepts: no legacy `:param` / `*wildcard`
/// segments, and every `{capture}` closed and non-empty. `{{` and `}}` are
/// literal braces.
fn is_routable(path: &str) -> bool {
    if path
        .split('/')
        .any(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        return false;
    }

    let mut capture: Option<usize> = None;
    let mut chars = path.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, capture) {
            ('{', None) if chars.peek() == Some(&'{') => {
                chars.next();
            }
            ('}', None) if chars.peek() == Some(&'}') => {
                chars.next();
            }
            ('{', None) => capture = Some(0),
            ('}', Some(0)) => return false,
            ('}', Some(_)) => capture = None,
            ('{', Some(_)) | ('}', None) => return false,
            (_, Some(len)) => capture = Some(len + 1),
            _ => {}
        }
    }
    capture.is_none()
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ProxyConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.proxy.route_path = "proxy".into();
        config.fetch.user_agent = "   ".into();
        config.timeouts.request_secs = 0;
        config.fetch.timeout_secs = Some(0);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::RelativeRoutePath("proxy".into())));
        assert!(errors.contains(&ValidationError::InvalidUserAgent));
        assert!(errors.contains(&ValidationError::ZeroTimeout("fetch.timeout_secs")));
    }

    #[test]
    fn test_health_path_is_reserved() {
        let mut config = ProxyConfig::default();
        config.proxy.route_path = "/health".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::ReservedRoutePath("/health".into())]);
    }

    #[test]
    fn test_unroutable_paths_are_rejected() {
        for path in ["/:img", "/img/*rest", "/{x", "/x}", "/{}", "/{a{b}}"] {
            let mut config = ProxyConfig::default();
            config.proxy.route_path = path.into();

            let errors = validate_config(&config).unwrap_err();
            assert_eq!(
                errors,
                vec![ValidationError::UnroutablePath(path.into())],
                "{path} should be rejected"
            );
        }
    }

    #[test]
    fn test_routable_paths_are_accepted() {
        for path in ["/proxy", "/.netlify/functions/proxy", "/img/{name}"] {
            let mut config = ProxyConfig::default();
            config.proxy.route_path = path.into();
            assert_eq!(validate_config(&config), Ok(()), "{path} should be accepted");
        }
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = ProxyConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::InvalidAddress { field: "observability.metrics_address", .. }
        ));
    }
}
