//! Metrics recording helpers.
//!
//! # Metrics
//! - `pairlink_ticks_total` (counter): poll ticks by outcome
//!   (`success`, `failure`, `connected`, `breaker_open`)
//! - `pairlink_rate_limited_total` (counter): ticks deferred by the global
//!   rate window
//! - `pairlink_breaker_trips_total` (counter): circuit breakers tripped open
//! - `pairlink_halts_total` (counter): operator/shutdown halts by reason
//! - `pairlink_active_pollers` (gauge): currently registered resources
//!
//! Uses the `metrics` facade only; the host process installs whatever
//! recorder/exporter it wants.

use metrics::{counter, gauge};

/// Record the outcome of one poll tick.
pub fn record_tick(outcome: &'static str) {
    counter!("pairlink_ticks_total", "outcome" => outcome).increment(1);
}

/// Record a tick deferred by the global rate window.
pub fn record_rate_limited() {
    counter!("pairlink_rate_limited_total").increment(1);
}

/// Record a circuit breaker tripping open.
pub fn record_breaker_trip() {
    counter!("pairlink_breaker_trips_total").increment(1);
}

/// Record an emergency stop or engine shutdown.
pub fn record_halt(reason: &'static str) {
    counter!("pairlink_halts_total", "reason" => reason).increment(1);
}

/// Update the active poller gauge.
pub fn set_active_pollers(count: usize) {
    gauge!("pairlink_active_pollers").set(count as f64);
}
