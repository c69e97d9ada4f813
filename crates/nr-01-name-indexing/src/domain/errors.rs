//! # Error Types
//!
//! Errors raised while reading or mutating the registry.

use thiserror::Error;

/// Key-value store errors surfaced by storage adapters.
///
/// "Key not found" is not an error: `get` returns `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

/// Errors from the name indexing subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexingError {
    /// Underlying store failure. Aborts the current unit of work.
    #[error("store error: {0}")]
    Store(#[from] KVStoreError),

    /// A record exists but cannot be decoded.
    #[error("corrupted registry record at key {key}")]
    Corrupted { key: String },

    /// The registry writer has shut down.
    #[error("registry writer is no longer running")]
    QueueClosed,
}
