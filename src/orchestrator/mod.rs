//! Orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! execute(wish, backend, operation, parameters)
//!     → PolicyGate::evaluate
//!         not sound → DispatchResult { success: false, PolicyBlocked }, dispatcher untouched
//!     → Dispatcher::call
//!         Ok  → DispatchResult { success: true, payload, output validation }
//!         Err → DispatchResult { success: false, execution-error verdict, failure }
//! ```
//!
//! # Design Decisions
//! - Admission and dispatch are two explicit steps, never a callback
//! - The caller always gets an envelope; failures are data in it
//! - No retries at this layer

mod result;

use std::sync::Arc;

use tracing::Instrument;
use uuid::Uuid;

use crate::dispatch::Dispatcher;
use crate::policy::{EthicalEvaluation, PolicyGate, Wish};

pub use result::{DispatchResult, FailureReason};

#[derive(Debug, Clone)]
pub struct Orchestrator {
    gate: Arc<PolicyGate>,
    dispatcher: Dispatcher,
}

impl Orchestrator {
    pub fn new(gate: PolicyGate, dispatcher: Dispatcher) -> Self {
        Self {
            gate: Arc::new(gate),
            dispatcher,
        }
    }

    /// Dry-run admission check.
    pub fn evaluate(&self, wish: &Wish) -> EthicalEvaluation {
        self.gate.evaluate(wish)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Admit `wish`, then forward `operation` to `backend` if it is sound.
    pub async fn execute(
        &self,
        wish: &Wish,
        backend: &str,
        operation: &str,
        parameters: serde_json::Value,
    ) -> DispatchResult {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "orchestrate",
            request_id = %request_id,
            backend = %backend,
            operation = %operation
        );

        async move {
            let evaluation = self.gate.evaluate(wish);
            if !evaluation.sound {
                tracing::warn!(
                    objective = %wish.objective,
                    reasoning = %evaluation.reasoning,
                    "Wish blocked by policy"
                );
                return DispatchResult::blocked(request_id, evaluation);
            }

            match self.dispatcher.call(backend, operation, parameters).await {
                Ok(payload) => DispatchResult::completed(request_id, payload),
                Err(e) => DispatchResult::failed(request_id, e),
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DispatchConfig, HealthCheckConfig, PolicyConfig};
    use crate::dispatch::DispatchError;
    use crate::health::HealthProbe;
    use crate::lifecycle::Shutdown;
    use crate::policy::evaluation::EXECUTION_ERROR;
    use crate::registry::Registry;
    use crate::testing::{descriptor, Script, ScriptedTransport};
    use serde_json::json;

    async fn orchestrator(transport: &ScriptedTransport, shutdown: &Shutdown) -> Orchestrator {
        let config = HealthCheckConfig {
            enabled: false,
            timeout_ms: Some(200),
            ..Default::default()
        };
        let probe = HealthProbe::new(Arc::new(transport.clone()), "/health", config.probe_timeout());
        let (registry, _task) = Registry::spawn(
            vec![descriptor("apple", true), descriptor("github", false)],
            probe,
            config,
            shutdown.subscribe(),
        )
        .unwrap();
        registry.probe_all().await.unwrap();

        let dispatch = DispatchConfig {
            timeout_ms: 200,
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(registry, Arc::new(transport.clone()), &dispatch);
        Orchestrator::new(PolicyGate::new(PolicyConfig::default()), dispatcher)
    }

    fn sound_wish() -> Wish {
        Wish::new("sync calendar").safeguards(["bias-detection", "human-override"])
    }

    #[tokio::test]
    async fn test_blocked_wish_never_dispatches() {
        let shutdown = Shutdown::new();
        let transport = ScriptedTransport::new()
            .with("apple", Script::Healthy)
            .with("github", Script::Healthy);
        let orchestrator = orchestrator(&transport, &shutdown).await;
        let before = transport.requests_to("apple");

        let result = orchestrator
            .execute(&Wish::new("delete all contacts"), "apple", "purge", json!({}))
            .await;

        assert!(!result.success);
        assert!(!result.human_override_used);
        assert!(result.payload.is_none());
        assert!(result.is_blocked());
        assert!(result.dispatch_error().is_none());
        assert_eq!(
            result.failure,
            Some(FailureReason::PolicyBlocked {
                reasoning: "Missing safeguards: bias-detection, human-override".into()
            })
        );
        assert_eq!(result.evaluation.trust_score, 0.8);
        assert_eq!(transport.requests_to("apple"), before);
    }

    #[tokio::test]
    async fn test_success_attaches_output_validation() {
        let shutdown = Shutdown::new();
        let transport = ScriptedTransport::new().with("apple", Script::Healthy);
        let orchestrator = orchestrator(&transport, &shutdown).await;
        transport.set("apple", Script::Json(json!({"events": 3})));

        let result = orchestrator
            .execute(&sound_wish(), "apple", "sync_calendar", json!({"days": 7}))
            .await;

        assert!(result.success);
        assert_eq!(result.payload, Some(json!({"events": 3})));
        assert!(result.evaluation.sound);
        assert_eq!(result.evaluation.trust_score, 0.8);
        assert_eq!(result.evaluation.reasoning, "Output validation passed");
        assert!(result.failure.is_none());
    }

    #[tokio::test]
    async fn test_unavailable_backend_is_execution_error() {
        let shutdown = Shutdown::new();
        let transport = ScriptedTransport::new().with("apple", Script::Healthy);
        let orchestrator = orchestrator(&transport, &shutdown).await;

        let result = orchestrator
            .execute(&sound_wish(), "github", "list_repos", json!({}))
            .await;

        assert!(!result.success);
        assert!(result.evaluation.human_review_required);
        assert!(result.evaluation.bias_indicators.contains(EXECUTION_ERROR));
        assert!(!result.is_blocked());
        assert_eq!(
            result.dispatch_error(),
            Some(&DispatchError::BackendUnavailable {
                backend: "github".into()
            })
        );
    }

    #[tokio::test]
    async fn test_evaluate_is_dry_run() {
        let shutdown = Shutdown::new();
        let transport = ScriptedTransport::new().with("apple", Script::Healthy);
        let orchestrator = orchestrator(&transport, &shutdown).await;
        let before = transport.total_requests();

        let evaluation = orchestrator.evaluate(&sound_wish());
        assert!(evaluation.sound);
        assert_eq!(transport.total_requests(), before);
    }
}
