//! Per-resource circuit breaker.
//!
//! # States
//! - Closed: normal operation, polls proceed
//! - Open: too many consecutive failures, polling for the resource stops
//! - Half-Open: reset timeout elapsed, counters cleared, one probe allowed
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= max_failures
//! Open → Half-Open: now - last_request_at > reset_timeout
//! Half-Open → Closed: next poll succeeds
//! Half-Open → Open: failures accumulate to the threshold again
//! ```
//!
//! # Design Decisions
//! - One breaker per resource, not global
//! - An open breaker is terminal for the poll loop: the caller is told
//!   explicitly (non-retryable error) instead of being silently suppressed

use std::time::Duration;
use tokio::time::Instant;

/// Mutable breaker bookkeeping, owned by a single poller.
#[derive(Debug, Default)]
pub struct BreakerState {
    /// Consecutive failures since the last success or reset.
    pub failure_count: u32,
    /// True once the failure threshold has been crossed.
    pub circuit_open: bool,
    /// Timestamp of the most recent outbound request.
    pub last_request_at: Option<Instant>,
    /// Timestamp of the most recent successful poll, for diagnostics.
    pub last_success_at: Option<Instant>,
}

/// Threshold/timeout policy applied to a [`BreakerState`].
#[derive(Debug, Clone, Copy)]
pub struct CircuitBreaker {
    max_failures: u32,
    reset_timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(max_failures: u32, reset_timeout: Duration) -> Self {
        Self {
            max_failures,
            reset_timeout,
        }
    }

    /// Record a failed poll. Returns true if this failure tripped the
    /// breaker open.
    pub fn record_failure(&self, state: &mut BreakerState) -> bool {
        state.failure_count += 1;
        if state.failure_count >= self.max_failures {
            state.circuit_open = true;
            tracing::warn!(
                failures = state.failure_count,
                threshold = self.max_failures,
                "Circuit breaker tripped open"
            );
            return true;
        }
        false
    }

    /// Record a successful poll: clears failures and closes the breaker.
    pub fn record_success(&self, state: &mut BreakerState) {
        state.failure_count = 0;
        state.circuit_open = false;
        state.last_success_at = Some(Instant::now());
    }

    /// Check whether the breaker blocks the next poll.
    ///
    /// If the reset timeout has elapsed since the last request, the breaker
    /// auto-resets (half-open): counters clear and the poll is allowed
    /// through as a probe.
    pub fn is_open(&self, state: &mut BreakerState, now: Instant) -> bool {
        if !state.circuit_open {
            return false;
        }

        let eligible = match state.last_request_at {
            Some(at) => now.duration_since(at) > self.reset_timeout,
            None => true,
        };

        if eligible {
            tracing::info!("Circuit breaker reset timeout elapsed, entering half-open probe");
            state.circuit_open = false;
            state.failure_count = 0;
            return false;
        }

        true
    }

    /// Whether a failure with the given count would still be retried.
    pub fn is_retryable(&self, failure_count: u32) -> bool {
        failure_count < self.max_failures
    }
}
