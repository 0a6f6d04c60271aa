//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::TwinConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}'")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, override from the process environment and validate a TOML file.
pub fn load_config(path: &Path) -> Result<TwinConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: TwinConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Defaults plus environment overrides, for running without a file.
pub fn load_defaults() -> Result<TwinConfig, ConfigError> {
    let mut config = TwinConfig::default();

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply the deployment environment variables on top of file values.
///
/// `lookup` abstracts the environment so overrides can be tested.
pub fn apply_env_overrides<F>(config: &mut TwinConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("ETHICS_ENABLED") {
        config.policy.enabled = value != "false";
    }
    if let Some(value) = lookup("ETHICS_TRUST_THRESHOLD") {
        config.policy.trust_threshold = value.parse().map_err(|_| ConfigError::Env {
            var: "ETHICS_TRUST_THRESHOLD",
            value: value.clone(),
        })?;
    }
    if let Some(value) = lookup("ETHICS_REQUIRE_HUMAN_REVIEW") {
        config.policy.require_human_review = value == "true";
    }
    if let Some(value) = lookup("ETHICS_BIAS_DETECTION") {
        config.policy.bias_detection = value != "false";
    }
    if let Some(value) = lookup("HEALTH_CHECK_INTERVAL") {
        config.health_check.interval_ms = value.parse().map_err(|_| ConfigError::Env {
            var: "HEALTH_CHECK_INTERVAL",
            value: value.clone(),
        })?;
    }
    if let Some(value) = lookup("LOG_LEVEL") {
        config.observability.log_level = value;
    }
    Ok(())
}
