//! Backend connection state machine.
//!
//! # States
//! - Disconnected: not reachable, excluded from dispatch
//! - Connecting: first probe of a disconnected backend is in flight
//! - Connected: last probe succeeded within the slow-probe budget
//! - Degraded: reachable with a warning (slow, or failing below threshold)
//!
//! # State Transitions
//! ```text
//! Disconnected → Connecting: probe cycle starts
//! Connecting → Connected | Degraded | Disconnected: probe result
//! Connected/Degraded → Degraded: failure, consecutive failures < unhealthy_threshold
//! Connected/Degraded → Disconnected: consecutive failures >= unhealthy_threshold
//! any → Disconnected: registry teardown
//! ```
//!
//! # Design Decisions
//! - Hysteresis prevents flapping
//! - Only the registry task calls the transition methods

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::health::probe::HealthCheckResult;
use crate::registry::BackendDescriptor;

/// Liveness of one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected,
    Degraded,
}

impl ConnectionStatus {
    /// Whether calls may be sent. Degraded counts, with a warning.
    pub fn is_reachable(self) -> bool {
        matches!(self, ConnectionStatus::Connected | ConnectionStatus::Degraded)
    }

    /// Gauge value exported as `twin_backend_status`.
    pub fn as_gauge(self) -> f64 {
        match self {
            ConnectionStatus::Disconnected => 0.0,
            ConnectionStatus::Connecting => 1.0,
            ConnectionStatus::Degraded => 2.0,
            ConnectionStatus::Connected => 3.0,
        }
    }
}

/// Answer to a reachability lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reachability {
    Reachable,
    ReachableWithWarning,
    Unreachable,
}

impl Reachability {
    pub fn allows_dispatch(self) -> bool {
        !matches!(self, Reachability::Unreachable)
    }
}

impl From<ConnectionStatus> for Reachability {
    fn from(status: ConnectionStatus) -> Self {
        match status {
            ConnectionStatus::Connected => Reachability::Reachable,
            ConnectionStatus::Degraded => Reachability::ReachableWithWarning,
            ConnectionStatus::Disconnected | ConnectionStatus::Connecting => {
                Reachability::Unreachable
            }
        }
    }
}

/// Mutable record for one backend, owned by the registry task.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionState {
    pub descriptor: BackendDescriptor,
    pub status: ConnectionStatus,
    pub last_probe_at: Option<DateTime<Utc>>,
    pub last_latency: Option<Duration>,
    pub last_error: Option<String>,
    pub consecutive_failures: u32,
}

impl ConnectionState {
    pub fn new(descriptor: BackendDescriptor) -> Self {
        Self {
            descriptor,
            status: ConnectionStatus::Disconnected,
            last_probe_at: None,
            last_latency: None,
            last_error: None,
            consecutive_failures: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// A probe is about to run against this backend.
    pub fn begin_probe(&mut self) {
        if self.status == ConnectionStatus::Disconnected {
            self.status = ConnectionStatus::Connecting;
        }
    }

    /// Fold one probe outcome into the record.
    ///
    /// Returns true when the status changed.
    pub fn apply(
        &mut self,
        result: &HealthCheckResult,
        unhealthy_threshold: u32,
        slow_probe: Duration,
    ) -> bool {
        let previous = self.status;
        self.last_probe_at = Some(result.checked_at);
        self.last_latency = Some(result.latency);

        if result.reachable {
            self.consecutive_failures = 0;
            self.last_error = None;
            self.status = if result.latency > slow_probe {
                ConnectionStatus::Degraded
            } else {
                ConnectionStatus::Connected
            };
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            self.last_error = result.error.clone();
            self.status = if !previous.is_reachable()
                || self.consecutive_failures >= unhealthy_threshold
            {
                ConnectionStatus::Disconnected
            } else {
                ConnectionStatus::Degraded
            };
        }

        previous != self.status
    }

    /// Registry is shutting down.
    pub fn teardown(&mut self) {
        self.status = ConnectionStatus::Disconnected;
        self.consecutive_failures = 0;
    }
}
