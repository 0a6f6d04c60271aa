//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! coordinator. All types derive Serde traits for deserialization from
//! config files.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Probe timeout is the interval divided by this factor when not set,
/// so a slow cycle can never run into the next one.
pub const PROBE_SAFETY_FACTOR: u64 = 2;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TwinConfig {
    /// Route layer listener.
    pub listener: ListenerConfig,

    /// Remote services to track and dispatch to.
    pub backends: Vec<BackendConfig>,

    /// Health check settings.
    pub health_check: HealthCheckConfig,

    /// Outbound call settings.
    pub dispatch: DispatchConfig,

    /// Policy gate settings.
    pub policy: PolicyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:3000").
    pub bind_address: String,

    /// Request timeout for the route layer in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Backend service definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Unique backend identifier.
    pub name: String,

    /// Base URL (e.g., "http://127.0.0.1:3001").
    pub endpoint: String,

    /// Whether the platform is unhealthy without this backend.
    #[serde(default)]
    pub critical: bool,
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Enable the periodic probing loop.
    pub enabled: bool,

    /// Probe cycle interval in milliseconds.
    pub interval_ms: u64,

    /// Per-probe timeout in milliseconds.
    pub timeout_ms: Option<u64>,

    /// Path to probe for HTTP health checks.
    pub path: String,

    /// Consecutive failures before a reachable backend is marked disconnected.
    pub unhealthy_threshold: u32,

    /// Probe latency above which a reachable backend is marked degraded.
    pub slow_probe_ms: u64,
}

impl HealthCheckConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Explicit timeout, or the interval divided by [`PROBE_SAFETY_FACTOR`].
    pub fn probe_timeout(&self) -> Duration {
        let ms = self
            .timeout_ms
            .unwrap_or(self.interval_ms / PROBE_SAFETY_FACTOR);
        Duration::from_millis(ms.max(1))
    }

    pub fn slow_probe(&self) -> Duration {
        Duration::from_millis(self.slow_probe_ms)
    }
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 30_000,
            timeout_ms: None,
            path: "/health".to_string(),
            unhealthy_threshold: 1,
            slow_probe_ms: 2_000,
        }
    }
}

/// Outbound call configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Per-call timeout in milliseconds.
    pub timeout_ms: u64,

    /// Path prefix placed before the operation name.
    pub operation_prefix: String,
}

impl DispatchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            operation_prefix: "/api".to_string(),
        }
    }
}

/// Policy gate configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// When false every wish gets the permissive evaluation.
    pub enabled: bool,

    /// Minimum trust score for a sound evaluation (0.0 - 1.0).
    pub trust_threshold: f64,

    /// Scan objective and context for bias keywords.
    pub bias_detection: bool,

    /// Flag every evaluation for human review.
    pub require_human_review: bool,

    /// Words that lower the trust score on each occurrence.
    pub risk_keywords: Vec<String>,

    /// Bias category -> keywords. Empty means the built-in table.
    pub bias_categories: BTreeMap<String, Vec<String>>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            trust_threshold: 0.7,
            bias_detection: true,
            require_human_review: false,
            risk_keywords: ["delete", "remove", "bypass", "override", "ignore", "hack"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            bias_categories: BTreeMap::new(),
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
            metrics_enabled: true,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
