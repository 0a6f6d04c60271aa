//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (probe.rs):
//!     Registry probe cycle
//!     → One bounded probe per backend
//!     → HealthCheckResult (never an error)
//!
//! State machine (state.rs):
//!     Disconnected → Connecting → Connected / Degraded
//!     With thresholds to prevent flapping
//!
//! Rollup (rollup.rs):
//!     All ConnectionStates → healthy / degraded / unhealthy
//! ```
//!
//! # Design Decisions
//! - Probe failures are data, so one bad backend cannot abort a cycle
//! - Health state is per-backend; criticality only matters in the rollup

pub mod probe;
pub mod rollup;
pub mod state;

pub use probe::{HealthCheckResult, HealthProbe};
pub use rollup::{aggregate, AggregateStatus, HealthReport};
pub use state::{ConnectionState, ConnectionStatus, Reachability};
