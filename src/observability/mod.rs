//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events: probe results, dispatch
//!       outcomes, gate verdicts)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - The core emits events; formatting and storage belong to the sink
//! - Metrics are cheap (atomic increments)
//! - Execution IDs flow through orchestrator and dispatcher spans

pub mod logging;
pub mod metrics;
