//! Polling registry.
//!
//! # Responsibilities
//! - Map resource id → active poller handle
//! - Enforce at most one active poller per resource
//! - Expose aggregate stats for observability
//!
//! Poller tasks mirror their live state (interval, failures, breaker flag)
//! into shared atomics so `stats()` never has to reach into a running task.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio_util::sync::CancellationToken;

use crate::error::StartError;

/// Live state a poller task publishes for observers of the registry.
#[derive(Debug)]
pub(crate) struct PollerShared {
    current_interval_ms: AtomicU64,
    failure_count: AtomicU32,
    circuit_open: AtomicBool,
}

impl PollerShared {
    pub(crate) fn new(initial_interval_ms: u64) -> Self {
        Self {
            current_interval_ms: AtomicU64::new(initial_interval_ms),
            failure_count: AtomicU32::new(0),
            circuit_open: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_interval(&self, interval: Duration) {
        self.current_interval_ms
            .store(interval.as_millis() as u64, Ordering::Relaxed);
    }

    pub(crate) fn set_failure_count(&self, count: u32) {
        self.failure_count.store(count, Ordering::Relaxed);
    }

    pub(crate) fn set_circuit_open(&self, open: bool) {
        self.circuit_open.store(open, Ordering::Relaxed);
    }

    fn interval_ms(&self) -> u64 {
        self.current_interval_ms.load(Ordering::Relaxed)
    }

    fn is_circuit_open(&self) -> bool {
        self.circuit_open.load(Ordering::Relaxed)
    }
}

/// Handle to one running poller.
pub(crate) struct PollerHandle {
    pub(crate) cancel: CancellationToken,
    pub(crate) shared: Arc<PollerShared>,
}

/// Aggregate view over all active pollers.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryStats {
    /// Number of registered, still-active pollers.
    pub active_pollers: usize,
    /// Mean current poll interval across active pollers (0 when none).
    pub avg_interval_ms: f64,
    /// Pollers whose circuit breaker is currently open.
    pub open_breakers: usize,
}

/// Process-wide map of resource id → poller handle.
pub(crate) struct Registry {
    pollers: DashMap<String, PollerHandle>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            pollers: DashMap::new(),
        }
    }

    /// Register a poller under `resource_id`, building the handle only once
    /// the slot is known to be free.
    ///
    /// The builder runs while the vacant entry is held, so a concurrent
    /// registration for the same id cannot interleave.
    pub(crate) fn register_with<F>(&self, resource_id: &str, build: F) -> Result<(), StartError>
    where
        F: FnOnce() -> Result<PollerHandle, StartError>,
    {
        match self.pollers.entry(resource_id.to_string()) {
            Entry::Occupied(_) => Err(StartError::AlreadyActive(resource_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(build()?);
                Ok(())
            }
        }
    }

    /// Cancel and remove a poller. Returns false for unknown ids.
    pub(crate) fn stop(&self, resource_id: &str) -> bool {
        if let Some((_, handle)) = self.pollers.remove(resource_id) {
            handle.cancel.cancel();
            true
        } else {
            false
        }
    }

    /// Remove the entry for `resource_id` only if it still belongs to the
    /// caller's poller. A stale terminal task must never evict a newer
    /// poller registered under the same id.
    pub(crate) fn remove_self(&self, resource_id: &str, shared: &Arc<PollerShared>) {
        self.pollers
            .remove_if(resource_id, |_, handle| Arc::ptr_eq(&handle.shared, shared));
    }

    /// Cancel every poller and clear the map. Returns how many were halted.
    pub(crate) fn drain_all(&self) -> usize {
        let ids: Vec<String> = self.pollers.iter().map(|e| e.key().clone()).collect();
        let mut halted = 0;
        for id in ids {
            if let Some((_, handle)) = self.pollers.remove(&id) {
                handle.cancel.cancel();
                halted += 1;
            }
        }
        halted
    }

    pub(crate) fn is_active(&self, resource_id: &str) -> bool {
        self.pollers.contains_key(resource_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.pollers.len()
    }

    pub(crate) fn stats(&self) -> RegistryStats {
        let mut count = 0usize;
        let mut interval_sum = 0u64;
        let mut open = 0usize;

        for entry in self.pollers.iter() {
            count += 1;
            interval_sum += entry.shared.interval_ms();
            if entry.shared.is_circuit_open() {
                open += 1;
            }
        }

        RegistryStats {
            active_pollers: count,
            avg_interval_ms: if count == 0 {
                0.0
            } else {
                interval_sum as f64 / count as f64
            },
            open_breakers: open,
        }
    }
}
