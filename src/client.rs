//! External status client contract.
//!
//! The engine never owns a transport: the host injects an implementation of
//! [`StatusClient`] (HTTP, in-process fake, etc.) and the poll loop treats
//! every failure it returns as a retryable poll failure.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Connection state reported by the remote service for a channel instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelState {
    /// Fully connected and paired.
    Open,
    /// Awaiting pairing; a QR artifact should be available.
    Connecting,
    /// Explicitly disconnected on the remote side.
    Close,
    /// Any state string this crate does not model.
    Unknown(String),
}

impl ChannelState {
    /// Parse the remote's raw state string.
    pub fn from_remote(raw: &str) -> Self {
        match raw {
            "open" => Self::Open,
            "connecting" => Self::Connecting,
            "close" => Self::Close,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// True when the resource is fully connected (terminal success).
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// True when the resource is waiting to be paired via QR.
    pub fn awaiting_pairing(&self) -> bool {
        matches!(self, Self::Connecting)
    }
}

impl std::fmt::Display for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Connecting => write!(f, "connecting"),
            Self::Close => write!(f, "close"),
            Self::Unknown(s) => write!(f, "{}", s),
        }
    }
}

/// Status snapshot for one channel instance.
#[derive(Debug, Clone)]
pub struct ChannelStatus {
    pub state: ChannelState,
}

/// Pairing artifact returned while a channel awaits pairing.
#[derive(Debug, Clone)]
pub struct QrArtifact {
    /// Rendered image bytes (typically PNG).
    pub image: Vec<u8>,
    /// Raw pairing payload encoded in the image.
    pub raw: String,
}

/// Failures the remote status service can produce.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure: timeout, refused connection, DNS.
    #[error("network error: {0}")]
    Network(String),

    /// The remote answered with a non-success status.
    #[error("remote service error ({status}): {message}")]
    Remote { status: u16, message: String },
}

/// Remote status service consumed by the poll loop.
#[async_trait]
pub trait StatusClient: Send + Sync {
    /// Fetch the current connection state for `external_name`.
    async fn get_status(&self, external_name: &str) -> Result<ChannelStatus, ClientError>;

    /// Fetch the pairing QR artifact for `external_name`.
    ///
    /// Best-effort from the engine's point of view: failures are logged and
    /// bounded but do not count as poll failures.
    async fn get_qr_artifact(&self, external_name: &str) -> Result<QrArtifact, ClientError>;
}
