//! Caller-facing event observer.

use std::time::SystemTime;

use crate::client::{ChannelState, QrArtifact};

/// Callback bundle supplied per registration.
///
/// For a single resource the engine guarantees strict ordering: a status
/// update always precedes the connected/error event of the same tick, and
/// after a terminal event (`on_connected` or `on_error` with
/// `retryable == false`) no further callback fires for that resource.
///
/// Implementations that panic are contained by the engine: the panic is
/// logged and scheduling continues as if the callback had returned.
pub trait ConnectionObserver: Send + Sync {
    /// The remote reported a (possibly unchanged) connection state.
    fn on_status_update(&self, resource_id: &str, state: &ChannelState, at: SystemTime);

    /// A fresh pairing artifact is available until `expires_at`.
    fn on_qr_update(
        &self,
        resource_id: &str,
        artifact: &QrArtifact,
        expires_at: SystemTime,
        at: SystemTime,
    );

    /// A poll failed. `retryable == false` means polling has ceased for
    /// this resource.
    fn on_error(&self, resource_id: &str, message: &str, at: SystemTime, retryable: bool);

    /// The resource is fully connected; polling has ceased.
    fn on_connected(&self, resource_id: &str, at: SystemTime);
}
