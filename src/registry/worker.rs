//! Registry worker task: sole owner of the connection table.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use futures_util::future::join_all;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};

use crate::config::HealthCheckConfig;
use crate::health::{aggregate, ConnectionState, HealthCheckResult, HealthProbe};
use crate::observability::metrics;
use crate::registry::{BackendDescriptor, RegistryError, RegistrySnapshot};

pub(crate) enum Command {
    Register {
        descriptor: BackendDescriptor,
        reply: oneshot::Sender<Result<(), RegistryError>>,
    },
    ProbeAll {
        reply: oneshot::Sender<Vec<HealthCheckResult>>,
    },
}

pub(crate) struct RegistryWorker {
    table: HashMap<String, ConnectionState>,
    probe: HealthProbe,
    config: HealthCheckConfig,
    published: Arc<ArcSwap<RegistrySnapshot>>,
    generation: u64,
}

impl RegistryWorker {
    pub(crate) fn new(
        table: HashMap<String, ConnectionState>,
        probe: HealthProbe,
        config: HealthCheckConfig,
        published: Arc<ArcSwap<RegistrySnapshot>>,
    ) -> Self {
        let mut worker = Self {
            table,
            probe,
            config,
            published,
            generation: 0,
        };
        worker.publish();
        worker
    }

    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let periodic = self.config.enabled;
        let mut commands_open = true;
        let mut ticker = time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            backends = self.table.len(),
            periodic,
            interval_ms = self.config.interval_ms,
            probe_timeout_ms = self.probe.timeout().as_millis() as u64,
            "Registry worker starting"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Registry received shutdown signal, exiting loop");
                    break;
                }
                command = commands.recv(), if commands_open => match command {
                    Some(command) => self.handle(command).await,
                    None if periodic => commands_open = false,
                    None => break,
                },
                _ = ticker.tick(), if periodic => {
                    self.probe_cycle().await;
                }
            }
        }

        self.teardown();
        tracing::info!("Registry worker stopped");
    }

    async fn handle(&mut self, command: Command) {
        match command {
            Command::Register { descriptor, reply } => {
                let _ = reply.send(self.register(descriptor));
            }
            Command::ProbeAll { reply } => {
                let results = self.probe_cycle().await;
                let _ = reply.send(results);
            }
        }
    }

    fn register(&mut self, descriptor: BackendDescriptor) -> Result<(), RegistryError> {
        if self.table.contains_key(&descriptor.name) {
            return Err(RegistryError::DuplicateBackend(descriptor.name));
        }
        tracing::info!(
            backend = %descriptor.name,
            endpoint = %descriptor.endpoint,
            critical = descriptor.critical,
            "Backend registered"
        );
        self.table
            .insert(descriptor.name.clone(), ConnectionState::new(descriptor));
        self.publish();
        Ok(())
    }

    /// One fan-out / fan-in round over every registered backend.
    async fn probe_cycle(&mut self) -> Vec<HealthCheckResult> {
        if self.table.is_empty() {
            return Vec::new();
        }

        for state in self.table.values_mut() {
            state.begin_probe();
        }
        self.publish();

        let targets: Vec<BackendDescriptor> = self
            .table
            .values()
            .map(|state| state.descriptor.clone())
            .collect();

        let tasks = targets.iter().cloned().map(|backend| {
            let probe = self.probe.clone();
            tokio::spawn(async move { probe.check(&backend).await })
        });
        let joined = join_all(tasks).await;

        let results: Vec<HealthCheckResult> = targets
            .iter()
            .zip(joined)
            .map(|(backend, outcome)| match outcome {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(backend = %backend.name, error = %e, "Probe task failed");
                    HealthCheckResult::failed(&backend.name, format!("probe task failed: {e}"))
                }
            })
            .collect();

        let threshold = self.config.unhealthy_threshold;
        let slow = self.config.slow_probe();
        for result in &results {
            let Some(state) = self.table.get_mut(&result.backend_name) else {
                continue;
            };
            let previous = state.status;
            if state.apply(result, threshold, slow) {
                tracing::info!(
                    backend = %result.backend_name,
                    from = ?previous,
                    to = ?state.status,
                    "Backend status changed"
                );
            }
            metrics::record_backend_status(&result.backend_name, state.status);
        }
        self.publish();

        let overall = aggregate(self.table.values());
        metrics::record_aggregate(overall);
        tracing::debug!(
            backends = results.len(),
            reachable = results.iter().filter(|r| r.reachable).count(),
            overall = %overall,
            "Probe cycle complete"
        );

        results
    }

    fn teardown(&mut self) {
        for state in self.table.values_mut() {
            state.teardown();
        }
        self.publish();
    }

    fn publish(&mut self) {
        self.generation += 1;
        self.published.store(Arc::new(RegistrySnapshot::new(
            self.table.clone(),
            self.generation,
        )));
    }
}
