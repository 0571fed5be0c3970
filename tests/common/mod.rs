//! Shared test doubles for engine integration tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use tokio::time::Instant;

use pairlink::{
    ChannelState, ChannelStatus, ClientError, ConnectionObserver, QrArtifact, StatusClient,
};

/// A scripted status client.
///
/// Pops one scripted response per call; the last response repeats once the
/// script runs out, so a single entry stands for "always answer this".
/// Records every status call's (virtual) timestamp for interval assertions.
pub struct ScriptedClient {
    statuses: Mutex<VecDeque<Result<ChannelStatus, ClientError>>>,
    qr_responses: Mutex<VecDeque<Result<QrArtifact, ClientError>>>,
    status_calls: AtomicU32,
    qr_calls: AtomicU32,
    call_times: Mutex<Vec<Instant>>,
    delay: Duration,
}

#[allow(dead_code)]
impl ScriptedClient {
    pub fn new(statuses: Vec<Result<ChannelStatus, ClientError>>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into()),
            qr_responses: Mutex::new(VecDeque::new()),
            status_calls: AtomicU32::new(0),
            qr_calls: AtomicU32::new(0),
            call_times: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    /// Script QR responses (otherwise every fetch succeeds with a fixed
    /// artifact).
    pub fn with_qr_responses(mut self, responses: Vec<Result<QrArtifact, ClientError>>) -> Self {
        self.qr_responses = Mutex::new(responses.into());
        self
    }

    /// Make every status call take `delay` of (virtual) time.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn qr_calls(&self) -> u32 {
        self.qr_calls.load(Ordering::SeqCst)
    }

    /// Virtual timestamps of every status call, in order.
    pub fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }

    fn next<T: Clone>(queue: &Mutex<VecDeque<T>>, fallback: T) -> T {
        let mut q = queue.lock().unwrap();
        match q.len() {
            0 => fallback,
            1 => q.front().unwrap().clone(),
            _ => q.pop_front().unwrap(),
        }
    }
}

#[async_trait]
impl StatusClient for ScriptedClient {
    async fn get_status(&self, _external_name: &str) -> Result<ChannelStatus, ClientError> {
        self.call_times.lock().unwrap().push(Instant::now());
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Self::next(&self.statuses, connecting())
    }

    async fn get_qr_artifact(&self, _external_name: &str) -> Result<QrArtifact, ClientError> {
        self.qr_calls.fetch_add(1, Ordering::SeqCst);
        Self::next(&self.qr_responses, Ok(qr_artifact()))
    }
}

/// Everything the engine told an observer, in dispatch order.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Event {
    Status {
        resource: String,
        state: ChannelState,
    },
    Qr {
        resource: String,
        at: SystemTime,
        expires_at: SystemTime,
    },
    Error {
        resource: String,
        message: String,
        retryable: bool,
    },
    Connected {
        resource: String,
    },
}

/// Observer that records every callback for later assertions.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

#[allow(dead_code)]
impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn events_for(&self, resource: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| {
                let id = match e {
                    Event::Status { resource, .. } => resource,
                    Event::Qr { resource, .. } => resource,
                    Event::Error { resource, .. } => resource,
                    Event::Connected { resource } => resource,
                };
                id.as_str() == resource
            })
            .collect()
    }
}

impl ConnectionObserver for RecordingObserver {
    fn on_status_update(&self, resource_id: &str, state: &ChannelState, _at: SystemTime) {
        self.events.lock().unwrap().push(Event::Status {
            resource: resource_id.to_string(),
            state: state.clone(),
        });
    }

    fn on_qr_update(
        &self,
        resource_id: &str,
        _artifact: &QrArtifact,
        expires_at: SystemTime,
        at: SystemTime,
    ) {
        self.events.lock().unwrap().push(Event::Qr {
            resource: resource_id.to_string(),
            at,
            expires_at,
        });
    }

    fn on_error(&self, resource_id: &str, message: &str, _at: SystemTime, retryable: bool) {
        self.events.lock().unwrap().push(Event::Error {
            resource: resource_id.to_string(),
            message: message.to_string(),
            retryable,
        });
    }

    fn on_connected(&self, resource_id: &str, _at: SystemTime) {
        self.events.lock().unwrap().push(Event::Connected {
            resource: resource_id.to_string(),
        });
    }
}

// --- Script helpers ---

#[allow(dead_code)]
pub fn open() -> Result<ChannelStatus, ClientError> {
    Ok(ChannelStatus {
        state: ChannelState::Open,
    })
}

#[allow(dead_code)]
pub fn connecting() -> Result<ChannelStatus, ClientError> {
    Ok(ChannelStatus {
        state: ChannelState::Connecting,
    })
}

#[allow(dead_code)]
pub fn net_err() -> Result<ChannelStatus, ClientError> {
    Err(ClientError::Network("connection refused".into()))
}

#[allow(dead_code)]
pub fn qr_artifact() -> QrArtifact {
    QrArtifact {
        image: vec![0x89, 0x50, 0x4e, 0x47],
        raw: "pairing-code".into(),
    }
}

#[allow(dead_code)]
pub fn qr_err() -> Result<QrArtifact, ClientError> {
    Err(ClientError::Remote {
        status: 500,
        message: "qr unavailable".into(),
    })
}
