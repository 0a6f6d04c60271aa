//! Aggregate health rollup.
//!
//! ```text
//! healthy   : every critical backend Connected, no optional backend down
//! degraded  : some critical backend reachable but not all Connected,
//!             or any optional backend down
//! unhealthy : no critical backend reachable
//! ```
//!
//! With no critical backends the rollup only distinguishes healthy from
//! degraded.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::health::state::{ConnectionState, ConnectionStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregateStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl AggregateStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateStatus::Healthy => "healthy",
            AggregateStatus::Degraded => "degraded",
            AggregateStatus::Unhealthy => "unhealthy",
        }
    }

    /// Gauge value exported as `twin_aggregate_status`.
    pub fn as_gauge(self) -> f64 {
        match self {
            AggregateStatus::Healthy => 2.0,
            AggregateStatus::Degraded => 1.0,
            AggregateStatus::Unhealthy => 0.0,
        }
    }
}

impl std::fmt::Display for AggregateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Criticality-weighted rollup over a set of backends.
pub fn aggregate<'a, I>(states: I) -> AggregateStatus
where
    I: IntoIterator<Item = &'a ConnectionState>,
{
    let mut critical_total = 0usize;
    let mut critical_reachable = 0usize;
    let mut critical_connected = 0usize;
    let mut optional_down = false;

    for state in states {
        if state.descriptor.critical {
            critical_total += 1;
            if state.status.is_reachable() {
                critical_reachable += 1;
            }
            if state.status == ConnectionStatus::Connected {
                critical_connected += 1;
            }
        } else if !state.status.is_reachable() {
            optional_down = true;
        }
    }

    if critical_total > 0 && critical_reachable == 0 {
        AggregateStatus::Unhealthy
    } else if critical_connected < critical_total || optional_down {
        AggregateStatus::Degraded
    } else {
        AggregateStatus::Healthy
    }
}

/// One line of the health report.
#[derive(Debug, Clone, Serialize)]
pub struct BackendReport {
    pub name: String,
    pub endpoint: String,
    pub critical: bool,
    pub status: ConnectionStatus,
    pub last_probe_at: Option<DateTime<Utc>>,
    pub latency_ms: Option<u128>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub total: usize,
    pub connected: usize,
    pub degraded: usize,
    pub down: usize,
}

/// Serializable view of the whole registry.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub overall_status: AggregateStatus,
    pub timestamp: DateTime<Utc>,
    pub backends: Vec<BackendReport>,
    pub summary: HealthSummary,
}

impl HealthReport {
    pub fn from_states<'a, I>(states: I) -> Self
    where
        I: IntoIterator<Item = &'a ConnectionState> + Clone,
    {
        let mut summary = HealthSummary::default();
        let mut backends: Vec<BackendReport> = states
            .clone()
            .into_iter()
            .map(|state| {
                summary.total += 1;
                match state.status {
                    ConnectionStatus::Connected => summary.connected += 1,
                    ConnectionStatus::Degraded => summary.degraded += 1,
                    ConnectionStatus::Disconnected | ConnectionStatus::Connecting => {
                        summary.down += 1
                    }
                }
                BackendReport {
                    name: state.descriptor.name.clone(),
                    endpoint: state.descriptor.endpoint.to_string(),
                    critical: state.descriptor.critical,
                    status: state.status,
                    last_probe_at: state.last_probe_at,
                    latency_ms: state.last_latency.map(|d: Duration| d.as_millis()),
                    error: state.last_error.clone(),
                }
            })
            .collect();
        backends.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            overall_status: aggregate(states),
            timestamp: Utc::now(),
            backends,
            summary,
        }
    }
}
