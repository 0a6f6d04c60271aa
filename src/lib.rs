//! Service registry with health monitoring and a policy-gated dispatcher.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod policy;
pub mod registry;
pub mod transport;

#[cfg(test)]
mod testing;

pub use config::schema::TwinConfig;
pub use lifecycle::Shutdown;
pub use orchestrator::{DispatchResult, FailureReason, Orchestrator};
pub use policy::{EthicalEvaluation, PolicyGate, Wish};
pub use registry::Registry;
