//! Engine-wide halt coordination.

use tokio::sync::broadcast;

/// Why the engine is halting. Emergency stops must be distinguishable from
/// organic shutdown in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// Orderly process shutdown.
    Shutdown,
    /// Operator-triggered emergency stop.
    Emergency,
}

impl HaltReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::Emergency => "emergency_stop",
        }
    }
}

impl std::fmt::Display for HaltReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Broadcast halt signal every poller task subscribes to, alongside its own
/// per-resource cancellation token.
pub struct Shutdown {
    tx: broadcast::Sender<HaltReason>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the halt signal.
    pub fn subscribe(&self) -> broadcast::Receiver<HaltReason> {
        self.tx.subscribe()
    }

    /// Broadcast a halt to all subscribed pollers.
    pub fn trigger(&self, reason: HaltReason) {
        let _ = self.tx.send(reason);
    }

    /// Number of poller tasks still subscribed.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
