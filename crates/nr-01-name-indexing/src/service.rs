//! # Name Indexing Service
//!
//! Implements [`NameIndexingApi`] on top of a [`RegistryStore`].
//!
//! Every block event ends in exactly one atomic batch: entry puts or
//! deletes, the disconnect journal, settled pending markers, the journal
//! that fell out of the reorg window and the new chain tip. Unconfirmed
//! transactions write directly, one name at a time.
//!
//! Pending markers are keyed by name, so there are never more of them than
//! entries. A marker whose transaction never confirms stays with its entry.

use crate::adapters::registry_store::{
    journal_operations, journal_removal, tip_operation, RegistryStore,
};
use crate::adapters::storage::InMemoryKVStore;
use crate::domain::entities::{ChainTip, IndexerConfig};
use crate::domain::errors::IndexingError;
use crate::domain::indexer::{plan_connect, plan_disconnect, transaction_frames};
use crate::domain::keys;
use crate::domain::mutation::{MutationBatch, MutationKind};
use crate::ports::inbound::NameIndexingApi;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use bitcoin::{Block, Transaction, Txid};
use shared_types::{ContentHash, Name};
use tracing::{debug, error, info};

pub struct NameIndexingService<S: KeyValueStore> {
    store: RegistryStore<S>,
    config: IndexerConfig,
}

impl<S: KeyValueStore> NameIndexingService<S> {
    pub fn new(kv: S, config: IndexerConfig) -> Self {
        Self {
            store: RegistryStore::new(kv),
            config,
        }
    }

    pub fn store(&self) -> &RegistryStore<S> {
        &self.store
    }

    /// Removal of the journal that leaves the reorg window once `height`
    /// is connected.
    fn expired_journal(&self, height: u64) -> Result<Vec<BatchOperation>, IndexingError> {
        if self.config.journal_depth == 0 {
            return Ok(Vec::new());
        }
        let Some(expired) = height.checked_sub(self.config.journal_depth) else {
            return Ok(Vec::new());
        };
        Ok(match self.store.journal_at(expired)? {
            Some(hash) => {
                debug!(height = expired, %hash, "[nr-01] Pruning disconnect journal");
                journal_removal(expired, &hash).into()
            }
            None => Vec::new(),
        })
    }

    fn register_unconfirmed(
        &mut self,
        tx: &Transaction,
        txid: Txid,
    ) -> Result<usize, IndexingError> {
        let pending = self.config.journal_disconnects.then_some(txid);
        let mut written = 0;

        for frame in transaction_frames(tx) {
            if self.store.entry(&frame.name)?.is_some() {
                debug!(name = %frame.name, %txid, "[nr-01] Name already registered, skipping");
                continue;
            }
            self.store
                .put_unconfirmed(&frame.name, &frame.content_hash, pending)?;
            written += 1;
            info!(name = %frame.name, %txid, "[nr-01] Registered name from unconfirmed transaction");
        }

        Ok(written)
    }
}

impl NameIndexingService<InMemoryKVStore> {
    /// Service over a fresh in-memory store.
    pub fn new_in_memory(config: IndexerConfig) -> Self {
        Self::new(InMemoryKVStore::new(), config)
    }
}

/// Store operations for a batch of entry mutations.
fn entry_operations(batch: &MutationBatch) -> Vec<BatchOperation> {
    batch
        .iter()
        .map(|op| {
            let key = keys::entry_key(&op.name);
            match op.kind {
                MutationKind::Put => BatchOperation::put(key, op.content_hash.to_hex()),
                MutationKind::Delete => BatchOperation::delete(key),
            }
        })
        .collect()
}

impl<S: KeyValueStore> NameIndexingApi for NameIndexingService<S> {
    fn connect_block(&mut self, block: &Block, height: u64) -> Result<MutationBatch, IndexingError> {
        let block_hash = block.block_hash();
        let plan = plan_connect(block, &self.store)?;

        let mut ops = entry_operations(&plan.batch);
        if self.config.journal_disconnects {
            for name in &plan.claimed {
                ops.push(BatchOperation::delete(keys::pending_key(name)));
            }
            // Blocks without frames reverse to nothing either way.
            if plan.frame_count > 0 {
                ops.extend(journal_operations(height, &block_hash, &plan.created)?);
            }
        }
        ops.extend(self.expired_journal(height)?);
        ops.push(tip_operation(Some(ChainTip {
            height,
            hash: block_hash,
        }))?);

        self.store.apply(ops)?;

        if plan.frame_count > 0 {
            info!(
                height,
                %block_hash,
                frames = plan.frame_count,
                registered = plan.batch.len(),
                confirmed = plan.claimed.len(),
                "[nr-01] Connected block"
            );
        } else {
            debug!(height, %block_hash, "[nr-01] Connected block without frames");
        }

        Ok(plan.batch)
    }

    fn disconnect_block(
        &mut self,
        block: &Block,
        height: u64,
    ) -> Result<MutationBatch, IndexingError> {
        let block_hash = block.block_hash();
        let journal = if self.config.journal_disconnects {
            self.store.journal(&block_hash)?
        } else {
            None
        };

        let batch = plan_disconnect(block, journal.as_deref());

        let mut ops = entry_operations(&batch);
        if journal.is_some() {
            ops.extend(journal_removal(height, &block_hash));
        }
        let previous = height.checked_sub(1).map(|height| ChainTip {
            height,
            hash: block.header.prev_blockhash,
        });
        ops.push(tip_operation(previous)?);

        self.store.apply(ops)?;

        info!(
            height,
            %block_hash,
            removed = batch.len(),
            journaled = journal.is_some(),
            "[nr-01] Disconnected block"
        );

        Ok(batch)
    }

    fn handle_unconfirmed(&mut self, tx: &Transaction) -> Result<usize, IndexingError> {
        let txid = tx.compute_txid();
        self.register_unconfirmed(tx, txid).inspect_err(|e| {
            error!(%txid, error = %e, "[nr-01] Aborted unconfirmed transaction");
        })
    }

    fn lookup(&self, name: &Name) -> Result<Option<ContentHash>, IndexingError> {
        self.store.entry(name)
    }

    fn tip(&self) -> Result<Option<ChainTip>, IndexingError> {
        self.store.tip()
    }

    fn identity_key(&self) -> Result<Option<String>, IndexingError> {
        self.store.identity_key()
    }

    fn store_identity_key(&mut self, wif: &str) -> Result<(), IndexingError> {
        self.store.put_identity_key(wif)
    }
}
