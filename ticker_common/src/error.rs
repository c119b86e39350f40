//! Error types shared between the board and the feed.
//!
//! The `TickerError` enum unifies the failure cases of I/O, JSON payloads,
//! channel communication and lock handling. Unparseable numeric fields and
//! updates for unknown symbols are not errors: they are recovered where they
//! occur and only counted.
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by the board and the feed.
#[derive(Error, Debug)]
pub enum TickerError {
    /// I/O error originating from the standard library or sockets/files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),
}

impl<T> From<PoisonError<T>> for TickerError {
    fn from(err: PoisonError<T>) -> Self {
        TickerError::MutexLock(err.to_string())
    }
}
