//! Cross-resource rate limiting.

pub mod window;

pub use window::GlobalRateLimiter;
