//! Active health probing.
//!
//! # Responsibilities
//! - Perform one bounded-time liveness check against a backend
//! - Convert every failure mode into data, never into an error

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time;

use crate::observability::metrics;
use crate::registry::BackendDescriptor;
use crate::transport::{join_url, Transport, TransportError, TransportRequest};

/// Outcome of one probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    pub backend_name: String,
    pub reachable: bool,
    pub latency: Duration,
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl HealthCheckResult {
    /// Result for a probe that never produced an answer (e.g. a panicked task).
    pub fn failed(backend_name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            backend_name: backend_name.into(),
            reachable: false,
            latency: Duration::ZERO,
            error: Some(error.into()),
            checked_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthProbe {
    transport: Arc<dyn Transport>,
    path: String,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(transport: Arc<dyn Transport>, path: impl Into<String>, timeout: Duration) -> Self {
        Self {
            transport,
            path: path.into(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe one backend. Never fails.
    pub async fn check(&self, backend: &BackendDescriptor) -> HealthCheckResult {
        let started = Instant::now();
        let outcome = self.round_trip(backend).await;
        let latency = started.elapsed();

        let error = match outcome {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(backend = %backend.name, error = %e, "Health check failed");
                Some(e.to_string())
            }
        };

        metrics::record_probe(&backend.name, error.is_none(), latency);

        HealthCheckResult {
            backend_name: backend.name.clone(),
            reachable: error.is_none(),
            latency,
            error,
            checked_at: Utc::now(),
        }
    }

    async fn round_trip(&self, backend: &BackendDescriptor) -> Result<(), TransportError> {
        let url = join_url(&backend.endpoint, &self.path)?;
        let request = TransportRequest::get(url);

        match time::timeout(self.timeout, self.transport.send(request)).await {
            // 4xx still proves the service is up
            Ok(Ok(response)) if response.status.is_server_error() => {
                Err(TransportError::Status(response.status.as_u16()))
            }
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(TransportError::Timeout(self.timeout)),
        }
    }
}
