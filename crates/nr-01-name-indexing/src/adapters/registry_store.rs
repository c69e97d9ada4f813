//! # Registry Store
//!
//! Typed records on top of a [`KeyValueStore`]. This is the only component
//! that touches persisted registry entries.

use crate::domain::entities::ChainTip;
use crate::domain::errors::IndexingError;
use crate::domain::indexer::RegistryView;
use crate::domain::keys;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use bitcoin::{BlockHash, Txid};
use shared_types::{ContentHash, Name};
use std::str::FromStr;

pub struct RegistryStore<S> {
    kv: S,
}

impl<S: KeyValueStore> RegistryStore<S> {
    pub fn new(kv: S) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    fn read_string(&self, key: &str) -> Result<Option<String>, IndexingError> {
        match self.kv.get(key.as_bytes())? {
            None => Ok(None),
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| corrupted(key)),
        }
    }

    pub fn entry(&self, name: &Name) -> Result<Option<ContentHash>, IndexingError> {
        let key = keys::entry_key(name);
        self.read_string(&key)?
            .map(|hex| ContentHash::from_hex(&hex).map_err(|_| corrupted(&key)))
            .transpose()
    }

    pub fn pending_txid(&self, name: &Name) -> Result<Option<Txid>, IndexingError> {
        let key = keys::pending_key(name);
        self.read_string(&key)?
            .map(|hex| Txid::from_str(&hex).map_err(|_| corrupted(&key)))
            .transpose()
    }

    /// Names `block_hash` created when it was connected.
    pub fn journal(&self, block_hash: &BlockHash) -> Result<Option<Vec<Name>>, IndexingError> {
        let key = keys::undo_key(block_hash);
        match self.kv.get(key.as_bytes())? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|_| corrupted(&key)),
        }
    }

    /// Hash of the journaled block at `height`.
    pub fn journal_at(&self, height: u64) -> Result<Option<BlockHash>, IndexingError> {
        let key = keys::undo_height_key(height);
        self.read_string(&key)?
            .map(|hex| BlockHash::from_str(&hex).map_err(|_| corrupted(&key)))
            .transpose()
    }

    pub fn tip(&self) -> Result<Option<ChainTip>, IndexingError> {
        let key = keys::tip_key();
        match self.kv.get(key.as_bytes())? {
            None => Ok(None),
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|_| corrupted(&key)),
        }
    }

    pub fn identity_key(&self) -> Result<Option<String>, IndexingError> {
        self.read_string(&keys::private_key_key())
    }

    pub fn put_identity_key(&mut self, wif: &str) -> Result<(), IndexingError> {
        self.kv
            .put(keys::private_key_key().as_bytes(), wif.as_bytes())?;
        Ok(())
    }

    /// Write an unconfirmed registration. With `pending` set, the entry and
    /// its pending marker land together.
    pub fn put_unconfirmed(
        &mut self,
        name: &Name,
        content_hash: &ContentHash,
        pending: Option<Txid>,
    ) -> Result<(), IndexingError> {
        let entry = keys::entry_key(name);
        match pending {
            None => self
                .kv
                .put(entry.as_bytes(), content_hash.to_hex().as_bytes())?,
            Some(txid) => self.kv.atomic_batch_write(vec![
                BatchOperation::put(entry, content_hash.to_hex()),
                BatchOperation::put(keys::pending_key(name), txid.to_string()),
            ])?,
        }
        Ok(())
    }

    pub fn apply(&mut self, operations: Vec<BatchOperation>) -> Result<(), IndexingError> {
        self.kv.atomic_batch_write(operations)?;
        Ok(())
    }
}

impl<S: KeyValueStore> RegistryView for RegistryStore<S> {
    fn entry(&self, name: &Name) -> Result<Option<ContentHash>, IndexingError> {
        RegistryStore::entry(self, name)
    }

    fn pending_txid(&self, name: &Name) -> Result<Option<Txid>, IndexingError> {
        RegistryStore::pending_txid(self, name)
    }
}

fn corrupted(key: &str) -> IndexingError {
    IndexingError::Corrupted {
        key: key.to_string(),
    }
}

/// Batch operation that records the chain tip, or clears it for `None`.
pub fn tip_operation(tip: Option<ChainTip>) -> Result<BatchOperation, IndexingError> {
    let key = keys::tip_key();
    match tip {
        None => Ok(BatchOperation::delete(key)),
        Some(tip) => {
            let value = serde_json::to_vec(&tip).map_err(|_| corrupted(&key))?;
            Ok(BatchOperation::put(key, value))
        }
    }
}

/// Batch operations that record a block's disconnect journal and index it
/// by height.
pub fn journal_operations(
    height: u64,
    block_hash: &BlockHash,
    names: &[Name],
) -> Result<[BatchOperation; 2], IndexingError> {
    let key = keys::undo_key(block_hash);
    let value = serde_json::to_vec(names).map_err(|_| corrupted(&key))?;
    Ok([
        BatchOperation::put(key, value),
        BatchOperation::put(keys::undo_height_key(height), block_hash.to_string()),
    ])
}

/// Batch operations that drop the journal of `block_hash` at `height`.
pub fn journal_removal(height: u64, block_hash: &BlockHash) -> [BatchOperation; 2] {
    [
        BatchOperation::delete(keys::undo_key(block_hash)),
        BatchOperation::delete(keys::undo_height_key(height)),
    ]
}
