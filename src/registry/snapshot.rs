//! Immutable registry snapshots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::health::{aggregate, AggregateStatus, ConnectionState, HealthReport, Reachability};
use crate::registry::RegistryError;

/// Point-in-time copy of every ConnectionState.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    backends: HashMap<String, ConnectionState>,
    generation: u64,
    taken_at: DateTime<Utc>,
}

impl Default for RegistrySnapshot {
    fn default() -> Self {
        Self {
            backends: HashMap::new(),
            generation: 0,
            taken_at: Utc::now(),
        }
    }
}

impl RegistrySnapshot {
    pub(crate) fn new(backends: HashMap<String, ConnectionState>, generation: u64) -> Self {
        Self {
            backends,
            generation,
            taken_at: Utc::now(),
        }
    }

    /// Increases with every publish.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ConnectionState> {
        self.backends.get(name)
    }

    pub fn states(&self) -> impl Iterator<Item = &ConnectionState> + Clone {
        self.backends.values()
    }

    pub fn reachability(&self, name: &str) -> Result<Reachability, RegistryError> {
        self.backends
            .get(name)
            .map(|state| Reachability::from(state.status))
            .ok_or_else(|| RegistryError::UnknownBackend(name.to_string()))
    }

    pub fn aggregate_status(&self) -> AggregateStatus {
        aggregate(self.backends.values())
    }

    pub fn report(&self) -> HealthReport {
        HealthReport::from_states(self.backends.values())
    }

    /// Names of reachable backends, sorted.
    pub fn connected_backends(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .backends
            .values()
            .filter(|state| state.status.is_reachable())
            .map(|state| state.name().to_string())
            .collect();
        names.sort();
        names
    }
}
