//! Engine lifecycle: shutdown signaling.

pub mod shutdown;

pub use shutdown::{HaltReason, Shutdown};
