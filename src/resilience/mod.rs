//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Poll tick for a resource:
//!     → circuit_breaker.rs (refuse the tick if the breaker is open)
//!     → On failure: backoff.rs (stretch the next interval)
//!     → circuit_breaker.rs (count the failure, trip at threshold)
//! ```
//!
//! # Design Decisions
//! - Backoff is deterministic; callers depend on exact interval progressions
//! - Breaker trip is terminal for a poller: the caller gets an explicit
//!   non-retryable error rather than silent suppression
//! - Both pieces are clock-free or clock-injected and unit-testable alone

pub mod backoff;
pub mod circuit_breaker;
