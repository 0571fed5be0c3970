//! Exponential backoff for poll intervals.
//!
//! Pure functions, no clock access. The poll loop feeds the current interval
//! back in after every failure and resets to the initial interval on success.

use std::time::Duration;

/// Calculate the next poll interval after a failure.
///
/// Grows the current interval by `multiplier` and caps it at `max`. No
/// jitter: callers rely on exact interval progressions.
pub fn next_interval(current: Duration, multiplier: f64, max: Duration) -> Duration {
    current.mul_f64(multiplier).min(max)
}

/// Interval to use after a success or breaker reset.
pub fn reset_interval(initial: Duration) -> Duration {
    initial
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_progression() {
        let max = Duration::from_millis(30_000);

        let i1 = next_interval(Duration::from_millis(5_000), 1.5, max);
        assert_eq!(i1, Duration::from_millis(7_500));

        let i2 = next_interval(i1, 1.5, max);
        assert_eq!(i2, Duration::from_millis(11_250));

        let i3 = next_interval(i2, 1.5, max);
        assert_eq!(i3, Duration::from_millis(16_875));
    }

    #[test]
    fn test_backoff_caps_at_max() {
        let max = Duration::from_millis(30_000);

        let capped = next_interval(Duration::from_millis(25_000), 1.5, max);
        assert_eq!(capped, max);

        // Once at the cap, stays at the cap
        assert_eq!(next_interval(max, 1.5, max), max);
    }

    #[test]
    fn test_reset_returns_initial() {
        assert_eq!(
            reset_interval(Duration::from_millis(5_000)),
            Duration::from_millis(5_000)
        );
    }
}
