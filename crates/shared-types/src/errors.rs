//! # Error Types
//!
//! Input validation errors shared by the indexing and registration subsystems.

use thiserror::Error;

/// Rejected caller input. `length` is the number of hex characters supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// Name is not 88 hex characters.
    #[error("invalid name: expected 88 hex characters, got {length}")]
    InvalidName { length: usize },

    /// Content hash is not 64 hex characters.
    #[error("invalid contentHash: expected 64 hex characters, got {length}")]
    InvalidContentHash { length: usize },
}
