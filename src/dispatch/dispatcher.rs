//! Reachability-gated outbound calls.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time;

use crate::config::DispatchConfig;
use crate::dispatch::DispatchError;
use crate::health::Reachability;
use crate::observability::metrics;
use crate::registry::{Registry, RegistryError};
use crate::transport::{join_url, Transport, TransportError, TransportRequest};

#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Registry,
    transport: Arc<dyn Transport>,
    timeout: Duration,
    operation_prefix: String,
}

impl Dispatcher {
    pub fn new(registry: Registry, transport: Arc<dyn Transport>, config: &DispatchConfig) -> Self {
        Self {
            registry,
            transport,
            timeout: config.timeout(),
            operation_prefix: config.operation_prefix.clone(),
        }
    }

    /// Cached reachability check; never touches the network.
    pub fn check_reachable(&self, backend: &str) -> Result<Reachability, DispatchError> {
        let reachability = self.registry.is_reachable(backend).map_err(|e| match e {
            RegistryError::UnknownBackend(name) => DispatchError::UnknownBackend { backend: name },
            _ => DispatchError::BackendUnavailable {
                backend: backend.to_string(),
            },
        })?;

        match reachability {
            Reachability::Unreachable => Err(DispatchError::BackendUnavailable {
                backend: backend.to_string(),
            }),
            Reachability::ReachableWithWarning => {
                tracing::warn!(backend = %backend, "Dispatching to degraded backend");
                Ok(reachability)
            }
            Reachability::Reachable => Ok(reachability),
        }
    }

    /// Forward `operation` with `parameters` to `backend`.
    ///
    /// The payload is returned as decoded JSON, otherwise untouched.
    pub async fn call(
        &self,
        backend: &str,
        operation: &str,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, DispatchError> {
        let started = Instant::now();
        let outcome = self.forward(backend, operation, parameters).await;
        let elapsed = started.elapsed();

        match &outcome {
            Ok(_) => {
                tracing::info!(
                    backend = %backend,
                    operation = %operation,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Dispatch succeeded"
                );
                metrics::record_dispatch(backend, true, "success", elapsed);
            }
            Err(e) => {
                tracing::warn!(
                    backend = %backend,
                    operation = %operation,
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "Dispatch failed"
                );
                let registered = !matches!(e, DispatchError::UnknownBackend { .. });
                metrics::record_dispatch(backend, registered, e.label(), elapsed);
            }
        }

        outcome
    }

    async fn forward(
        &self,
        backend: &str,
        operation: &str,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, DispatchError> {
        self.check_reachable(backend)?;

        let descriptor = self
            .registry
            .state(backend)
            .map_err(|_| DispatchError::UnknownBackend {
                backend: backend.to_string(),
            })?
            .descriptor;

        let failure = |cause: TransportError| DispatchError::DispatchFailure {
            backend: backend.to_string(),
            cause,
        };

        let path = format!(
            "{}/{}",
            self.operation_prefix.trim_end_matches('/'),
            operation.trim_start_matches('/')
        );
        let url = join_url(&descriptor.endpoint, &path).map_err(failure)?;
        let request = TransportRequest::post_json(url, parameters);

        let response = match time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(cause)) => return Err(failure(cause)),
            Err(_) => return Err(failure(TransportError::Timeout(self.timeout))),
        };

        if !response.status.is_success() {
            return Err(failure(TransportError::Status(response.status.as_u16())));
        }
        if response.body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_slice(&response.body)
            .map_err(|e| failure(TransportError::Malformed(e.to_string())))
    }
}
