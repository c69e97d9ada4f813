//! # Outbound Ports (Driven Ports)
//!
//! What registration needs from the ledger node and from the registry.

use crate::domain::errors::RegistrationError;
use crate::domain::utxo::SpendableOutput;
use async_trait::async_trait;
use bitcoin::Address;
use shared_types::{ContentHash, Name};
use std::sync::Arc;

/// External unspent-output index.
#[async_trait]
pub trait UtxoIndex: Send + Sync {
    /// Spendable outputs paying `address`, in index order. With
    /// `include_mempool` unconfirmed outputs are included.
    async fn unspent_outputs(
        &self,
        address: &Address,
        include_mempool: bool,
    ) -> Result<Vec<SpendableOutput>, RegistrationError>;

    /// Start reporting outputs paying `address`. Indexes that already see
    /// every address keep the default.
    async fn watch(&self, _address: &Address) -> Result<(), RegistrationError> {
        Ok(())
    }
}

/// Ledger submission interface.
#[async_trait]
pub trait TransactionBroadcaster: Send + Sync {
    /// Submit a serialized transaction. Rejection is a `BroadcastError`.
    async fn broadcast(&self, raw_tx: &[u8]) -> Result<(), RegistrationError>;
}

/// Read access to the name registry.
#[async_trait]
pub trait NameRegistry: Send + Sync {
    async fn lookup(&self, name: &Name) -> Result<Option<ContentHash>, RegistrationError>;
}

/// Persistence for the identity key.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn load_key(&self) -> Result<Option<String>, RegistrationError>;

    async fn store_key(&self, wif: &str) -> Result<(), RegistrationError>;
}

#[async_trait]
impl<T: UtxoIndex + ?Sized> UtxoIndex for Arc<T> {
    async fn unspent_outputs(
        &self,
        address: &Address,
        include_mempool: bool,
    ) -> Result<Vec<SpendableOutput>, RegistrationError> {
        (**self).unspent_outputs(address, include_mempool).await
    }

    async fn watch(&self, address: &Address) -> Result<(), RegistrationError> {
        (**self).watch(address).await
    }
}

#[async_trait]
impl<T: TransactionBroadcaster + ?Sized> TransactionBroadcaster for Arc<T> {
    async fn broadcast(&self, raw_tx: &[u8]) -> Result<(), RegistrationError> {
        (**self).broadcast(raw_tx).await
    }
}
