//! # Error Types

use nr_01_name_indexing::IndexingError;
use shared_types::InputError;
use thiserror::Error;

/// Errors from the registration subsystem.
///
/// `InvalidInput` and `AlreadyRegistered` are caller rejections. Everything
/// else is an internal failure of that registration attempt and is never
/// retried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("name already registered")]
    AlreadyRegistered,

    /// No spendable output of at least `required` satoshis.
    #[error("insufficient funds: no spendable output of at least {required} sat")]
    InsufficientFunds { required: u64 },

    #[error("invalid identity key: {0}")]
    InvalidIdentityKey(String),

    #[error("signing failed: {0}")]
    SigningError(String),

    /// The assembled transaction failed strict validation.
    #[error("transaction rejected: {0}")]
    SerializationError(String),

    #[error("broadcast failed: {0}")]
    BroadcastError(String),

    /// Unspent output index could not be queried.
    #[error("ledger query failed: {0}")]
    Ledger(String),

    #[error("registry store failed: {0}")]
    Store(#[from] IndexingError),
}

impl RegistrationError {
    /// Whether the caller supplied a bad request rather than the node failing.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            RegistrationError::InvalidInput(_) | RegistrationError::AlreadyRegistered
        )
    }
}
