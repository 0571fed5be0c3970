//! Caller-side error taxonomy.

/// Errors returned when registering a resource with the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    /// The resource already has an active poller; registration never
    /// silently replaces one.
    #[error("resource '{0}' already has an active poller")]
    AlreadyActive(String),

    /// The global rate window has no capacity for a first tick right now.
    #[error("global rate limit exceeded, try again shortly")]
    RateLimited,
}
