//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator (wish already admitted)
//!     → dispatcher.rs: Registry::is_reachable (snapshot read)
//!         unreachable → BackendUnavailable, no network attempt
//!     → Transport::send under the per-call timeout
//!     → payload passed back unchanged, or DispatchFailure { cause }
//! ```
//!
//! # Design Decisions
//! - Known-down backends fail fast instead of eating the caller's deadline
//! - No retries here; the caller decides using the typed error
//! - Every call is logged and counted, success or failure

pub mod dispatcher;

use serde::Serialize;
use thiserror::Error;

use crate::transport::TransportError;

pub use dispatcher::Dispatcher;

/// Why a call did not produce a payload.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchError {
    /// The backend name is not registered.
    #[error("unknown backend '{backend}'")]
    UnknownBackend { backend: String },

    /// Registry reports the backend down; nothing was sent.
    #[error("backend '{backend}' is unavailable")]
    BackendUnavailable { backend: String },

    /// The call was attempted and failed in transit.
    #[error("call to '{backend}' failed: {cause}")]
    DispatchFailure {
        backend: String,
        cause: TransportError,
    },
}

impl DispatchError {
    /// Short label used in metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            DispatchError::UnknownBackend { .. } => "unknown_backend",
            DispatchError::BackendUnavailable { .. } => "unavailable",
            DispatchError::DispatchFailure { .. } => "failure",
        }
    }
}
