//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the engine.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the polling engine.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    /// Poll interval and backoff settings.
    pub polling: PollingConfig,

    /// Circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Global (cross-resource) rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Poll interval, backoff, and QR settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// First poll delay and the interval used after every success, in
    /// milliseconds.
    pub initial_interval_ms: u64,

    /// Upper bound on the backoff interval in milliseconds.
    pub max_interval_ms: u64,

    /// Multiplier applied to the interval after each failure.
    pub backoff_multiplier: f64,

    /// Lifetime advertised with each QR artifact in milliseconds.
    pub qr_lifetime_ms: u64,

    /// Consecutive QR-fetch failures tolerated before the next failure is
    /// escalated to the circuit breaker.
    pub max_qr_failures: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: 5_000,
            max_interval_ms: 30_000,
            backoff_multiplier: 1.5,
            qr_lifetime_ms: 45_000,
            max_qr_failures: 5,
        }
    }
}

impl PollingConfig {
    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn qr_lifetime(&self) -> Duration {
        Duration::from_millis(self.qr_lifetime_ms)
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Consecutive failures before the breaker opens.
    pub max_failures: u32,

    /// Cool-down before an open breaker allows a half-open probe, in
    /// milliseconds.
    pub reset_timeout_ms: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            max_failures: 3,
            reset_timeout_ms: 60_000,
        }
    }
}

impl BreakerConfig {
    pub fn reset_timeout(&self) -> Duration {
        Duration::from_millis(self.reset_timeout_ms)
    }
}

/// Global rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum outbound status calls per window across all resources.
    pub limit: u32,

    /// Window length in milliseconds.
    pub window_ms: u64,

    /// How long a deferred tick waits before retrying acquisition, in
    /// milliseconds.
    pub defer_retry_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            window_ms: 1_000,
            defer_retry_ms: 250,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    pub fn defer_retry(&self) -> Duration {
        Duration::from_millis(self.defer_retry_ms)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
