//! Global fixed-window rate limiter.
//!
//! One window is shared across every registered poller: it caps total
//! outbound status calls per second regardless of how many resources are
//! active. Ticks that cannot acquire capacity defer and retry shortly
//! instead of dropping.

use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

use crate::observability::metrics;

/// Counter state for the current window.
#[derive(Debug)]
struct Window {
    count: u32,
    window_start: Instant,
}

/// Cross-resource request budget over a fixed window.
#[derive(Debug)]
pub struct GlobalRateLimiter {
    inner: Mutex<Window>,
    limit: u32,
    window: Duration,
}

impl GlobalRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            inner: Mutex::new(Window {
                count: 0,
                window_start: Instant::now(),
            }),
            limit,
            window,
        }
    }

    /// Try to consume one request slot in the current window.
    ///
    /// Rolls the window forward when it has elapsed. Returns false when the
    /// budget for the current window is spent.
    pub fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut w = self.inner.lock().expect("rate limiter mutex poisoned");

        if now.duration_since(w.window_start) > self.window {
            w.count = 0;
            w.window_start = now;
        }

        if w.count < self.limit {
            w.count += 1;
            true
        } else {
            metrics::record_rate_limited();
            false
        }
    }

    /// Zero the window. Used on shutdown and emergency stop.
    pub fn reset(&self) {
        let mut w = self.inner.lock().expect("rate limiter mutex poisoned");
        w.count = 0;
        w.window_start = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_limit_enforced_within_window() {
        let limiter = GlobalRateLimiter::new(3, Duration::from_millis(1_000));

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_rolls_over() {
        let limiter = GlobalRateLimiter::new(2, Duration::from_millis(1_000));

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        tokio::time::advance(Duration::from_millis(1_001)).await;

        assert!(limiter.try_acquire());
        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_count() {
        let limiter = GlobalRateLimiter::new(1, Duration::from_millis(1_000));

        assert!(limiter.try_acquire());
        assert!(!limiter.try_acquire());

        limiter.reset();
        assert!(limiter.try_acquire());
    }
}
