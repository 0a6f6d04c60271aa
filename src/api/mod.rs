//! HTTP route layer.
//!
//! # Responsibilities
//! - Expose the registry's health view and per-backend reachability
//! - Accept wishes for dry-run evaluation or full orchestration
//! - Map orchestration envelopes onto HTTP status codes
//!
//! # Design Decisions
//! - Handlers are thin: every decision lives in the orchestrator
//! - Policy refusals are 200 with `success: false`; only dispatch errors
//!   change the status code

pub mod handlers;

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::orchestrator::Orchestrator;
use crate::registry::Registry;

use self::handlers::*;

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Registry,
    pub orchestrator: Orchestrator,
}

/// Build the router with trace and timeout layers.
#[allow(deprecated)]
pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(get_health))
        .route("/health/all", get(get_health_all))
        .route("/backends/{name}", get(get_backend))
        .route("/evaluate", post(post_evaluate))
        .route("/orchestrate", post(post_orchestrate))
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
