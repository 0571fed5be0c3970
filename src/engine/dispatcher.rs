//! Panic-isolated callback delivery.
//!
//! # Responsibilities
//! - Deliver status/QR/error/connected events to the registering caller
//! - Contain panics from caller-supplied observer code so they can never
//!   abort the poll loop or leave a poller unaccounted for

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::SystemTime;

use crate::client::{ChannelState, QrArtifact};
use crate::observer::ConnectionObserver;

/// Wraps one resource's observer; every dispatch is panic-contained.
pub(crate) struct CallbackDispatcher {
    resource_id: String,
    observer: Arc<dyn ConnectionObserver>,
}

impl CallbackDispatcher {
    pub(crate) fn new(resource_id: String, observer: Arc<dyn ConnectionObserver>) -> Self {
        Self {
            resource_id,
            observer,
        }
    }

    fn deliver<F: FnOnce()>(&self, event: &'static str, f: F) {
        if catch_unwind(AssertUnwindSafe(f)).is_err() {
            tracing::error!(
                resource = %self.resource_id,
                event,
                "Observer callback panicked; continuing"
            );
        }
    }

    pub(crate) fn status_update(&self, state: &ChannelState) {
        let at = SystemTime::now();
        self.deliver("status_update", || {
            self.observer.on_status_update(&self.resource_id, state, at)
        });
    }

    pub(crate) fn qr_update(&self, artifact: &QrArtifact, expires_at: SystemTime) {
        let at = SystemTime::now();
        self.deliver("qr_update", || {
            self.observer
                .on_qr_update(&self.resource_id, artifact, expires_at, at)
        });
    }

    pub(crate) fn error(&self, message: &str, retryable: bool) {
        let at = SystemTime::now();
        self.deliver("error", || {
            self.observer
                .on_error(&self.resource_id, message, at, retryable)
        });
    }

    pub(crate) fn connected(&self) {
        let at = SystemTime::now();
        self.deliver("connected", || {
            self.observer.on_connected(&self.resource_id, at)
        });
    }
}
