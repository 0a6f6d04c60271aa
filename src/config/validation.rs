//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (threshold in [0, 1], timeouts > 0)
//! - Check backend identities are unique and endpoints parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TwinConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::TwinConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("policy.trust_threshold must be within [0, 1], got {0}")]
    TrustThreshold(f64),

    #[error("health_check.interval_ms must be greater than 0")]
    ZeroInterval,

    #[error("health_check.timeout_ms must be within (0, interval_ms], got {0}")]
    ProbeTimeout(u64),

    #[error("health_check.unhealthy_threshold must be at least 1")]
    ZeroUnhealthyThreshold,

    #[error("dispatch.timeout_ms must be greater than 0")]
    ZeroDispatchTimeout,

    #[error("backend name must not be empty")]
    EmptyBackendName,

    #[error("duplicate backend name '{0}'")]
    DuplicateBackend(String),

    #[error("backend '{name}' has invalid endpoint '{endpoint}'")]
    InvalidEndpoint { name: String, endpoint: String },

    #[error("{field} is not a socket address: '{value}'")]
    InvalidAddress { field: &'static str, value: String },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &TwinConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let threshold = config.policy.trust_threshold;
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        errors.push(ValidationError::TrustThreshold(threshold));
    }

    let health = &config.health_check;
    if health.interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if let Some(timeout) = health.timeout_ms {
        if timeout == 0 || (health.interval_ms > 0 && timeout > health.interval_ms) {
            errors.push(ValidationError::ProbeTimeout(timeout));
        }
    }
    if health.unhealthy_threshold == 0 {
        errors.push(ValidationError::ZeroUnhealthyThreshold);
    }

    if config.dispatch.timeout_ms == 0 {
        errors.push(ValidationError::ZeroDispatchTimeout);
    }

    let mut seen = HashSet::new();
    for backend in &config.backends {
        if backend.name.trim().is_empty() {
            errors.push(ValidationError::EmptyBackendName);
        } else if !seen.insert(backend.name.as_str()) {
            errors.push(ValidationError::DuplicateBackend(backend.name.clone()));
        }

        let valid_endpoint = Url::parse(&backend.endpoint)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.has_host())
            .unwrap_or(false);
        if !valid_endpoint {
            errors.push(ValidationError::InvalidEndpoint {
                name: backend.name.clone(),
                endpoint: backend.endpoint.clone(),
            });
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
