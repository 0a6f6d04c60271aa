//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → transport → registry task → dispatcher → gate → orchestrator
//!
//! Shutdown (shutdown.rs):
//!     trigger → server stops accepting → registry finishes cycle, tears down → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → daemon triggers graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then the listener
//! - Ordered shutdown: stop accepting, then wait for the registry teardown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::Services;
