//! Per-resource poll loop.
//!
//! # Responsibilities
//! - Own one resource's polling lifecycle from registration to a terminal
//!   state (connected, breaker open, or stopped)
//! - Gate every tick on the circuit breaker and the global rate window
//! - Drive backoff on failures, reset it on success
//!
//! # Design Decisions
//! - One task per resource; all mutable poll state is task-local, mirrored
//!   into [`PollerShared`] atomics for `stats()`
//! - Cancellation is re-checked after every await and before re-arming the
//!   sleep, so a `stop()` racing an in-flight tick can never double-dispatch
//!   or re-schedule
//! - QR fetches are best-effort: failures are logged and bounded
//!   (`max_qr_failures` consecutive misses escalate to the breaker) but a
//!   blip never counts as a poll failure

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::sync::broadcast;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::client::{ClientError, StatusClient};
use crate::config::EngineConfig;
use crate::engine::dispatcher::CallbackDispatcher;
use crate::engine::registry::{PollerShared, Registry};
use crate::lifecycle::HaltReason;
use crate::limiter::GlobalRateLimiter;
use crate::observability::metrics;
use crate::resilience::backoff;
use crate::resilience::circuit_breaker::{BreakerState, CircuitBreaker};

/// Everything one poller task needs, assembled by the engine at
/// registration.
pub(crate) struct PollerContext {
    pub(crate) resource_id: String,
    pub(crate) external_name: String,
    pub(crate) config: EngineConfig,
    pub(crate) client: Arc<dyn StatusClient>,
    pub(crate) limiter: Arc<GlobalRateLimiter>,
    pub(crate) registry: Arc<Registry>,
    pub(crate) shared: Arc<PollerShared>,
    pub(crate) cancel: CancellationToken,
    pub(crate) shutdown: broadcast::Receiver<HaltReason>,
    pub(crate) dispatcher: CallbackDispatcher,
}

/// Outcome of one tick, deciding how the loop proceeds.
enum TickOutcome {
    /// Re-arm the sleep with the current interval.
    Continue,
    /// Rate window exhausted; retry after the short deferral delay.
    Deferred,
    /// Terminal state reached; the task exits.
    Terminal,
}

/// Run the poll loop until a terminal state or cancellation.
pub(crate) async fn run(mut ctx: PollerContext) {
    let breaker = CircuitBreaker::new(
        ctx.config.breaker.max_failures,
        ctx.config.breaker.reset_timeout(),
    );
    let mut state = PollingState::new(&ctx.config);

    tracing::debug!(
        resource = %ctx.resource_id,
        external = %ctx.external_name,
        interval_ms = ctx.config.polling.initial_interval_ms,
        "Poller task started"
    );

    // First poll fires one full interval after registration.
    let mut delay = state.interval;

    loop {
        tokio::select! {
            _ = ctx.cancel.cancelled() => break,
            halt = ctx.shutdown.recv() => {
                if let Ok(reason) = halt {
                    tracing::debug!(resource = %ctx.resource_id, reason = %reason, "Poller halted");
                }
                break;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        match tick(&ctx, &breaker, &mut state).await {
            TickOutcome::Continue => delay = state.interval,
            TickOutcome::Deferred => delay = ctx.config.rate_limit.defer_retry(),
            TickOutcome::Terminal => break,
        }

        // stop() may have raced the tick; never re-arm after cancellation.
        if ctx.cancel.is_cancelled() {
            break;
        }
    }

    ctx.registry.remove_self(&ctx.resource_id, &ctx.shared);
    metrics::set_active_pollers(ctx.registry.len());
    tracing::debug!(resource = %ctx.resource_id, "Poller task exited");
}

/// Task-local mutable poll state for one resource.
struct PollingState {
    interval: Duration,
    breaker: BreakerState,
    qr_failures: u32,
}

impl PollingState {
    fn new(config: &EngineConfig) -> Self {
        Self {
            interval: config.polling.initial_interval(),
            breaker: BreakerState::default(),
            qr_failures: 0,
        }
    }
}

async fn tick(
    ctx: &PollerContext,
    breaker: &CircuitBreaker,
    state: &mut PollingState,
) -> TickOutcome {
    // Breaker gate. A trip is terminal below, so reaching this with an open
    // breaker means the task is waiting out the reset timeout.
    if state.breaker.circuit_open {
        if breaker.is_open(&mut state.breaker, Instant::now()) {
            metrics::record_tick("breaker_open");
            ctx.dispatcher
                .error("circuit breaker open; polling stopped", false);
            return TickOutcome::Terminal;
        }
        // Half-open: breaker cleared itself, start over at the initial pace.
        state.interval = backoff::reset_interval(ctx.config.polling.initial_interval());
        publish(ctx, state);
    }

    if !ctx.limiter.try_acquire() {
        tracing::debug!(
            resource = %ctx.resource_id,
            defer_ms = ctx.config.rate_limit.defer_retry_ms,
            "Global rate window exhausted, deferring tick"
        );
        return TickOutcome::Deferred;
    }

    state.breaker.last_request_at = Some(Instant::now());
    let result = ctx.client.get_status(&ctx.external_name).await;

    // A result arriving after stop() is discarded, not dispatched.
    if ctx.cancel.is_cancelled() {
        return TickOutcome::Terminal;
    }

    match result {
        Ok(status) => {
            ctx.dispatcher.status_update(&status.state);

            if status.state.is_connected() {
                metrics::record_tick("connected");
                tracing::info!(resource = %ctx.resource_id, "Resource connected, polling complete");
                ctx.dispatcher.connected();
                return TickOutcome::Terminal;
            }

            let mut qr_escalation: Option<ClientError> = None;
            if status.state.awaiting_pairing() {
                match fetch_qr(ctx, state).await {
                    QrOutcome::Done => {}
                    QrOutcome::Cancelled => return TickOutcome::Terminal,
                    QrOutcome::Escalate(err) => qr_escalation = Some(err),
                }
            }

            match qr_escalation {
                Some(err) => {
                    metrics::record_tick("failure");
                    handle_failure(ctx, breaker, state, &err.to_string())
                }
                None => {
                    metrics::record_tick("success");
                    breaker.record_success(&mut state.breaker);
                    state.interval =
                        backoff::reset_interval(ctx.config.polling.initial_interval());
                    publish(ctx, state);
                    TickOutcome::Continue
                }
            }
        }
        Err(err) => {
            metrics::record_tick("failure");
            handle_failure(ctx, breaker, state, &err.to_string())
        }
    }
}

enum QrOutcome {
    Done,
    Cancelled,
    Escalate(ClientError),
}

/// Best-effort QR fetch for a resource still awaiting pairing.
async fn fetch_qr(ctx: &PollerContext, state: &mut PollingState) -> QrOutcome {
    let result = ctx.client.get_qr_artifact(&ctx.external_name).await;

    if ctx.cancel.is_cancelled() {
        return QrOutcome::Cancelled;
    }

    match result {
        Ok(artifact) => {
            state.qr_failures = 0;
            let expires_at = SystemTime::now() + ctx.config.polling.qr_lifetime();
            ctx.dispatcher.qr_update(&artifact, expires_at);
            QrOutcome::Done
        }
        Err(err) => {
            state.qr_failures += 1;
            if state.qr_failures > ctx.config.polling.max_qr_failures {
                tracing::warn!(
                    resource = %ctx.resource_id,
                    consecutive = state.qr_failures,
                    error = %err,
                    "QR fetch failing persistently, escalating to circuit breaker"
                );
                return QrOutcome::Escalate(err);
            }
            tracing::warn!(
                resource = %ctx.resource_id,
                consecutive = state.qr_failures,
                error = %err,
                "QR fetch failed (best-effort, not counted as poll failure)"
            );
            QrOutcome::Done
        }
    }
}

/// Record a poll failure: breaker bookkeeping, error dispatch, backoff.
fn handle_failure(
    ctx: &PollerContext,
    breaker: &CircuitBreaker,
    state: &mut PollingState,
    message: &str,
) -> TickOutcome {
    let tripped = breaker.record_failure(&mut state.breaker);

    tracing::warn!(
        resource = %ctx.resource_id,
        failures = state.breaker.failure_count,
        retryable = !tripped,
        error = %message,
        "Poll failed"
    );
    ctx.dispatcher.error(message, !tripped);

    if tripped {
        metrics::record_breaker_trip();
        publish(ctx, state);
        return TickOutcome::Terminal;
    }

    state.interval = backoff::next_interval(
        state.interval,
        ctx.config.polling.backoff_multiplier,
        ctx.config.polling.max_interval(),
    );
    publish(ctx, state);
    TickOutcome::Continue
}

/// Mirror task-local state into the shared atomics the registry reads.
fn publish(ctx: &PollerContext, state: &PollingState) {
    ctx.shared.set_interval(state.interval);
    ctx.shared.set_failure_count(state.breaker.failure_count);
    ctx.shared.set_circuit_open(state.breaker.circuit_open);
}
