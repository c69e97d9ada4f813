//! # Inbound Ports (Driving Ports)

use crate::domain::errors::RegistrationError;
use async_trait::async_trait;
use bitcoin::{Address, Txid};
use shared_types::ContentHash;

/// Request surface of the registry.
#[async_trait]
pub trait RegistrationApi: Send + Sync {
    /// Look up a name given as 88 hex characters.
    ///
    /// `Ok(None)` is the normal "not found" answer.
    async fn lookup(&self, name: &str) -> Result<Option<ContentHash>, RegistrationError>;

    /// Register `name` (88 hex) -> `content_hash` (64 hex).
    ///
    /// ## Errors
    ///
    /// - `InvalidInput`: bad hex or length, checked before touching the store
    /// - `AlreadyRegistered`: an entry exists; no funds are spent
    /// - `InsufficientFunds`: no identity output covers the fixed fee
    /// - `SigningError`, `SerializationError`, `BroadcastError`, `Ledger`, `Store`
    async fn register(&self, name: &str, content_hash: &str) -> Result<Txid, RegistrationError>;

    /// Address that funds registrations.
    fn funding_address(&self) -> &Address;
}
