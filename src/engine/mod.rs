//! Engine façade.
//!
//! An [`Engine`] is an explicit instance (no global singleton): construct it
//! once with a config and a [`StatusClient`], hand out references, and shut
//! it down explicitly. Each registered resource gets its own poller task;
//! the engine owns the registry, the global rate window, and the shutdown
//! broadcast they all share.

pub(crate) mod dispatcher;
pub(crate) mod poller;
pub mod registry;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::client::StatusClient;
use crate::config::EngineConfig;
use crate::error::StartError;
use crate::lifecycle::{HaltReason, Shutdown};
use crate::limiter::GlobalRateLimiter;
use crate::observability::metrics;
use crate::observer::ConnectionObserver;
use dispatcher::CallbackDispatcher;
use poller::PollerContext;
use registry::{PollerHandle, PollerShared, Registry, RegistryStats};

/// Connection-polling engine: one instance per process (or per tenant pool).
pub struct Engine {
    config: EngineConfig,
    client: Arc<dyn StatusClient>,
    registry: Arc<Registry>,
    limiter: Arc<GlobalRateLimiter>,
    shutdown: Shutdown,
}

impl Engine {
    /// Build an engine around an injected status client.
    pub fn new(config: EngineConfig, client: Arc<dyn StatusClient>) -> Self {
        let limiter = Arc::new(GlobalRateLimiter::new(
            config.rate_limit.limit,
            config.rate_limit.window(),
        ));

        Self {
            config,
            client,
            registry: Arc::new(Registry::new()),
            limiter,
            shutdown: Shutdown::new(),
        }
    }

    /// Register a resource and schedule its first poll.
    ///
    /// Rejects with [`StartError::AlreadyActive`] while a poller for
    /// `resource_id` exists, and with [`StartError::RateLimited`] (leaving
    /// no state behind) when the global window has no capacity for a first
    /// tick. The first poll fires one `initial_interval` after this call.
    pub fn start_polling(
        &self,
        resource_id: impl Into<String>,
        external_name: impl Into<String>,
        observer: Arc<dyn ConnectionObserver>,
    ) -> Result<(), StartError> {
        let resource_id = resource_id.into();
        let external_name = external_name.into();

        let cancel = CancellationToken::new();
        let shared = Arc::new(PollerShared::new(self.config.polling.initial_interval_ms));

        self.registry.register_with(&resource_id, || {
            if !self.limiter.try_acquire() {
                return Err(StartError::RateLimited);
            }
            Ok(PollerHandle {
                cancel: cancel.clone(),
                shared: shared.clone(),
            })
        })?;

        metrics::set_active_pollers(self.registry.len());
        tracing::info!(
            resource = %resource_id,
            external = %external_name,
            "Poller registered"
        );

        let ctx = PollerContext {
            dispatcher: CallbackDispatcher::new(resource_id.clone(), observer),
            resource_id,
            external_name,
            config: self.config.clone(),
            client: self.client.clone(),
            limiter: self.limiter.clone(),
            registry: self.registry.clone(),
            shared,
            cancel,
            shutdown: self.shutdown.subscribe(),
        };
        tokio::spawn(poller::run(ctx));

        Ok(())
    }

    /// Stop polling a resource. Idempotent: unknown or already-stopped ids
    /// are a no-op. Returns whether a poller was actually stopped.
    pub fn stop(&self, resource_id: &str) -> bool {
        let stopped = self.registry.stop(resource_id);
        if stopped {
            metrics::set_active_pollers(self.registry.len());
            tracing::info!(resource = %resource_id, "Poller stopped");
        }
        stopped
    }

    /// Whether `resource_id` currently has an active poller.
    pub fn is_active(&self, resource_id: &str) -> bool {
        self.registry.is_active(resource_id)
    }

    /// Aggregate stats over all active pollers.
    pub fn stats(&self) -> RegistryStats {
        self.registry.stats()
    }

    /// Operator-triggered halt: cancel every poller, clear the registry,
    /// zero the rate window. Safe to call repeatedly.
    pub fn emergency_stop(&self) {
        self.halt_all(HaltReason::Emergency);
    }

    /// Process-shutdown halt. Same mechanics as [`Engine::emergency_stop`],
    /// distinguishable in logs and metrics.
    pub fn shutdown(&self) {
        self.halt_all(HaltReason::Shutdown);
    }

    fn halt_all(&self, reason: HaltReason) {
        let halted = self.registry.drain_all();
        self.shutdown.trigger(reason);
        self.limiter.reset();

        metrics::record_halt(reason.as_str());
        metrics::set_active_pollers(0);
        tracing::warn!(reason = %reason, halted, "All pollers halted");
    }
}
