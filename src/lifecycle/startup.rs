//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the transport, registry, dispatcher, gate and orchestrator
//! - Spawn the registry worker (and with it the periodic health loop)
//! - Hand back the handles the route layer needs
//!
//! # Design Decisions
//! - Fail fast: an invalid backend definition aborts startup
//! - Subsystems initialize in dependency order, not concurrently
//! - The listener is bound by the caller, after `start` returns

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::TwinConfig;
use crate::dispatch::Dispatcher;
use crate::health::HealthProbe;
use crate::lifecycle::Shutdown;
use crate::orchestrator::Orchestrator;
use crate::policy::PolicyGate;
use crate::registry::{BackendDescriptor, Registry, RegistryError};
use crate::transport::{HttpTransport, Transport};

/// Running coordinator services.
pub struct Services {
    pub registry: Registry,
    pub orchestrator: Orchestrator,
    registry_task: JoinHandle<()>,
}

impl Services {
    /// Start everything over the real HTTP transport.
    pub fn start(config: &TwinConfig, shutdown: &Shutdown) -> Result<Self, RegistryError> {
        Self::start_with_transport(config, Arc::new(HttpTransport::new()), shutdown)
    }

    pub fn start_with_transport(
        config: &TwinConfig,
        transport: Arc<dyn Transport>,
        shutdown: &Shutdown,
    ) -> Result<Self, RegistryError> {
        let descriptors = config
            .backends
            .iter()
            .map(BackendDescriptor::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let probe = HealthProbe::new(
            transport.clone(),
            config.health_check.path.clone(),
            config.health_check.probe_timeout(),
        );
        let (registry, registry_task) = Registry::spawn(
            descriptors,
            probe,
            config.health_check.clone(),
            shutdown.subscribe(),
        )?;

        let dispatcher = Dispatcher::new(registry.clone(), transport, &config.dispatch);
        let gate = PolicyGate::new(config.policy.clone());
        if !gate.is_enabled() {
            tracing::warn!("Policy gate disabled, every wish will be admitted");
        }
        let orchestrator = Orchestrator::new(gate, dispatcher);

        tracing::info!(
            backends = config.backends.len(),
            trust_threshold = config.policy.trust_threshold,
            health_checks = config.health_check.enabled,
            "Services started"
        );

        Ok(Self {
            registry,
            orchestrator,
            registry_task,
        })
    }

    /// Wait for the registry worker to finish its teardown.
    ///
    /// Call after the shutdown signal has been triggered.
    pub async fn stop(self) {
        if let Err(e) = self.registry_task.await {
            tracing::error!(error = %e, "Registry task ended abnormally");
        }
        tracing::info!("Services stopped");
    }
}
