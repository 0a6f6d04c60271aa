use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::dispatch::DispatchError;
use crate::health::{AggregateStatus, ConnectionStatus, Reachability};
use crate::orchestrator::FailureReason;
use crate::policy::{EthicalEvaluation, Wish};
use crate::registry::RegistryError;

#[derive(Serialize)]
pub struct ServiceStatus {
    pub name: &'static str,
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct BackendStatus {
    pub name: String,
    pub critical: bool,
    pub status: ConnectionStatus,
    pub reachability: Reachability,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrchestrateRequest {
    pub wish: Wish,
    pub backend: String,
    pub operation: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

pub async fn get_health() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_health_all(State(state): State<AppState>) -> Response {
    let report = state.registry.report();
    let code = match report.overall_status {
        AggregateStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        AggregateStatus::Healthy | AggregateStatus::Degraded => StatusCode::OK,
    };
    (code, Json(report)).into_response()
}

pub async fn get_backend(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.registry.state(&name) {
        Ok(backend) => Json(BackendStatus {
            name: backend.descriptor.name.clone(),
            critical: backend.descriptor.critical,
            status: backend.status,
            reachability: backend.status.into(),
            consecutive_failures: backend.consecutive_failures,
            last_error: backend.last_error,
        })
        .into_response(),
        Err(e @ RegistryError::UnknownBackend(_)) => error_body(StatusCode::NOT_FOUND, &e),
        Err(e) => error_body(StatusCode::SERVICE_UNAVAILABLE, &e),
    }
}

pub async fn post_evaluate(
    State(state): State<AppState>,
    Json(wish): Json<Wish>,
) -> Json<EthicalEvaluation> {
    Json(state.orchestrator.evaluate(&wish))
}

pub async fn post_orchestrate(
    State(state): State<AppState>,
    Json(request): Json<OrchestrateRequest>,
) -> Response {
    let result = state
        .orchestrator
        .execute(
            &request.wish,
            &request.backend,
            &request.operation,
            request.parameters,
        )
        .await;

    let code = match &result.failure {
        None | Some(FailureReason::PolicyBlocked { .. }) => StatusCode::OK,
        Some(FailureReason::Dispatch(DispatchError::UnknownBackend { .. })) => StatusCode::NOT_FOUND,
        Some(FailureReason::Dispatch(DispatchError::BackendUnavailable { .. })) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        Some(FailureReason::Dispatch(DispatchError::DispatchFailure { .. })) => {
            StatusCode::BAD_GATEWAY
        }
    };
    (code, Json(result)).into_response()
}

fn error_body(code: StatusCode, error: &dyn std::fmt::Display) -> Response {
    (
        code,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}
