//! Connection Polling & Resilience Engine
//!
//! Keeps a local record of externally-pairing messaging-channel resources in
//! sync with a remote status service that changes state outside this
//! process's control.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌───────────────────────────────────────────────┐
//!                      │                    ENGINE                      │
//!                      │                                                │
//!   start_polling ─────┼─▶ registry ──▶ poller task (one per resource)  │
//!                      │       ▲              │                         │
//!                      │       │              ▼                         │
//!                      │       │        ┌──────────┐   ┌────────────┐   │
//!                      │       │        │ breaker  │   │  backoff   │   │
//!                      │       │        └────┬─────┘   └─────┬──────┘   │
//!                      │       │             ▼               │          │
//!                      │       │        global rate window ◀─┘          │
//!                      │       │             │                          │
//!                      │       └── terminal ─┤                          │
//!                      │                     ▼                          │
//!                      │            StatusClient (injected)             │
//!                      │                     │                          │
//!   observer callbacks ◀── dispatcher ◀──────┘                          │
//!                      └───────────────────────────────────────────────┘
//! ```
//!
//! Every poll tick passes the circuit-breaker gate, then the global rate
//! window, then calls the injected [`StatusClient`]. Successes reset
//! backoff; failures stretch the interval and feed the breaker; terminal
//! events (connected, breaker open, stop) deregister the resource. Caller
//! callbacks go through a panic-isolating dispatcher so observer bugs can
//! never corrupt scheduling.

// Core subsystems
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod observer;

// Resilience and traffic control
pub mod limiter;
pub mod resilience;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use client::{ChannelState, ChannelStatus, ClientError, QrArtifact, StatusClient};
pub use config::EngineConfig;
pub use engine::registry::RegistryStats;
pub use engine::Engine;
pub use error::StartError;
pub use observer::ConnectionObserver;
