//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define coordinator metrics (probes, dispatches, policy verdicts)
//! - Expose Prometheus-compatible metrics endpoint
//! - Track per-backend and aggregate health
//!
//! # Metrics
//! - `twin_probe_total` (counter): probes by backend, outcome
//! - `twin_probe_latency_seconds` (histogram): probe round trip by backend
//! - `twin_backend_status` (gauge): 3=connected, 2=degraded, 1=connecting, 0=disconnected
//! - `twin_aggregate_status` (gauge): 2=healthy, 1=degraded, 0=unhealthy
//! - `twin_dispatch_total` (counter): calls by backend, outcome
//! - `twin_dispatch_duration_seconds` (histogram): call latency by backend
//! - `twin_policy_verdicts_total` (counter): sound / blocked / bypassed / fault
//! - `twin_trust_score` (histogram): computed trust scores
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade: atomic, never blocks,
//!   and a no-op until a recorder is installed

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::health::{AggregateStatus, ConnectionStatus};

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_probe(backend: &str, reachable: bool, latency: Duration) {
    let outcome = if reachable { "reachable" } else { "unreachable" };
    counter!("twin_probe_total", "backend" => backend.to_string(), "outcome" => outcome)
        .increment(1);
    histogram!("twin_probe_latency_seconds", "backend" => backend.to_string())
        .record(latency.as_secs_f64());
}

pub fn record_backend_status(backend: &str, status: ConnectionStatus) {
    gauge!("twin_backend_status", "backend" => backend.to_string()).set(status.as_gauge());
}

pub fn record_aggregate(status: AggregateStatus) {
    gauge!("twin_aggregate_status").set(status.as_gauge());
}

/// Label used for every backend name the registry does not know.
pub const UNKNOWN_BACKEND: &str = "unknown";

/// Record one dispatch. Only registered names become label values;
/// caller-supplied names and operations stay in the logs.
pub fn record_dispatch(backend: &str, registered: bool, outcome: &'static str, elapsed: Duration) {
    let backend = if registered { backend } else { UNKNOWN_BACKEND };
    counter!(
        "twin_dispatch_total",
        "backend" => backend.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("twin_dispatch_duration_seconds", "backend" => backend.to_string())
        .record(elapsed.as_secs_f64());
}

pub fn record_verdict(verdict: &'static str, trust_score: f64) {
    counter!("twin_policy_verdicts_total", "verdict" => verdict).increment(1);
    histogram!("twin_trust_score").record(trust_score);
}
