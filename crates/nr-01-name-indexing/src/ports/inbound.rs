//! # Inbound Ports (Driving Ports)
//!
//! The API the host drives the indexing subsystem through.

use crate::domain::entities::ChainTip;
use crate::domain::errors::IndexingError;
use crate::domain::mutation::MutationBatch;
use bitcoin::{Block, Transaction};
use shared_types::{ContentHash, Name};

/// Primary API for the name indexing subsystem.
///
/// Calls must be serialized: one block is fully processed before the next
/// event is handled. [`RegistryHandle`](crate::queue::RegistryHandle) provides
/// that guarantee for concurrent callers.
pub trait NameIndexingApi {
    /// Index a newly connected block at `height` and commit its batch.
    ///
    /// ## Atomicity
    ///
    /// Entries, journal, settled pending markers and the chain tip are
    /// written in one batch. A store failure commits nothing.
    fn connect_block(&mut self, block: &Block, height: u64) -> Result<MutationBatch, IndexingError>;

    /// Reverse a block removed by a reorganization and commit the deletes.
    fn disconnect_block(
        &mut self,
        block: &Block,
        height: u64,
    ) -> Result<MutationBatch, IndexingError>;

    /// Speculatively register names carried by an unconfirmed transaction.
    ///
    /// Returns the number of names written. Writes are not undone if the
    /// transaction never confirms.
    fn handle_unconfirmed(&mut self, tx: &Transaction) -> Result<usize, IndexingError>;

    /// Look up the content hash registered for `name`.
    fn lookup(&self, name: &Name) -> Result<Option<ContentHash>, IndexingError>;

    /// Last block folded into the registry.
    fn tip(&self) -> Result<Option<ChainTip>, IndexingError>;

    /// Persisted identity key (WIF), if one has been created.
    fn identity_key(&self) -> Result<Option<String>, IndexingError>;

    /// Persist the identity key. Written once on first startup.
    fn store_identity_key(&mut self, wif: &str) -> Result<(), IndexingError>;
}
