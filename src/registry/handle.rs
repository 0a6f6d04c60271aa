//! Cloneable registry handle.

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::config::HealthCheckConfig;
use crate::health::{
    AggregateStatus, ConnectionState, HealthCheckResult, HealthProbe, HealthReport, Reachability,
};
use crate::registry::worker::{Command, RegistryWorker};
use crate::registry::{BackendDescriptor, RegistryError, RegistrySnapshot};

const COMMAND_BUFFER: usize = 32;

/// Handle to the registry worker.
///
/// Reads go straight to the latest published snapshot; mutations are
/// commands executed by the worker task.
#[derive(Debug, Clone)]
pub struct Registry {
    commands: mpsc::Sender<Command>,
    snapshot: Arc<ArcSwap<RegistrySnapshot>>,
}

impl Registry {
    /// Start the worker task with an initial set of backends.
    ///
    /// The returned `JoinHandle` completes after the shutdown signal fired,
    /// any in-flight probe cycle finished, and every backend was torn down.
    pub fn spawn(
        descriptors: Vec<BackendDescriptor>,
        probe: HealthProbe,
        config: HealthCheckConfig,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(Self, JoinHandle<()>), RegistryError> {
        let mut table = HashMap::with_capacity(descriptors.len());
        for descriptor in descriptors {
            if table.contains_key(&descriptor.name) {
                return Err(RegistryError::DuplicateBackend(descriptor.name));
            }
            table.insert(descriptor.name.clone(), ConnectionState::new(descriptor));
        }

        let snapshot = Arc::new(ArcSwap::from_pointee(RegistrySnapshot::default()));
        let worker = RegistryWorker::new(table, probe, config, snapshot.clone());

        let (commands, receiver) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(worker.run(receiver, shutdown));

        Ok((Self { commands, snapshot }, task))
    }

    /// Add a backend. It starts `Disconnected` until its first probe.
    pub async fn register(&self, descriptor: BackendDescriptor) -> Result<(), RegistryError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::Register { descriptor, reply })
            .await
            .map_err(|_| RegistryError::Stopped)?;
        response.await.map_err(|_| RegistryError::Stopped)?
    }

    /// Run one probe cycle now and wait for it to complete.
    pub async fn probe_all(&self) -> Result<Vec<HealthCheckResult>, RegistryError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command::ProbeAll { reply })
            .await
            .map_err(|_| RegistryError::Stopped)?;
        response.await.map_err(|_| RegistryError::Stopped)
    }

    pub fn is_reachable(&self, name: &str) -> Result<Reachability, RegistryError> {
        self.snapshot.load().reachability(name)
    }

    /// Copy of one backend's current state.
    pub fn state(&self, name: &str) -> Result<ConnectionState, RegistryError> {
        self.snapshot
            .load()
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownBackend(name.to_string()))
    }

    pub fn aggregate_status(&self) -> AggregateStatus {
        self.snapshot.load().aggregate_status()
    }

    pub fn report(&self) -> HealthReport {
        self.snapshot.load().report()
    }

    pub fn connected_backends(&self) -> Vec<String> {
        self.snapshot.load().connected_backends()
    }

    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.snapshot.load_full()
    }
}
