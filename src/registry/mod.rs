//! Backend registry subsystem.
//!
//! # Data Flow
//! ```text
//! Registry handle (handle.rs), cloned into dispatcher / route layer
//!     register / probe_all → mpsc command → worker task
//!     is_reachable / aggregate_status / report → snapshot read (no I/O)
//!
//! Worker task (worker.rs), sole owner of the connection table
//!     ticker or ProbeAll command
//!     → fan out one probe task per backend
//!     → fan in, apply each result to its own ConnectionState
//!     → publish new immutable snapshot (snapshot.rs)
//!     → on shutdown: finish in-flight cycle, tear down, exit
//! ```
//!
//! # Design Decisions
//! - Single-owner table behind a task boundary; readers only ever see whole
//!   published snapshots, never a record being updated
//! - Commands are processed one at a time, so probe cycles never overlap
//! - Lookups are O(1) map reads on the current snapshot

pub mod backend;
pub mod handle;
pub mod snapshot;
mod worker;

use thiserror::Error;

pub use backend::BackendDescriptor;
pub use handle::Registry;
pub use snapshot::RegistrySnapshot;

/// Registry misuse and lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("backend '{0}' is already registered")]
    DuplicateBackend(String),

    #[error("unknown backend '{0}'")]
    UnknownBackend(String),

    #[error("backend '{name}' has invalid endpoint: {reason}")]
    InvalidEndpoint { name: String, reason: String },

    #[error("registry worker has stopped")]
    Stopped,
}
