//! # Block Indexer
//!
//! Turns a block into an ordered batch of registry mutations.
//!
//! ## Connect
//!
//! Transactions and their outputs are walked strictly in block order. Only
//! the first frame for a name inside one block is considered, and it only
//! produces a put when the registry has no entry for that name yet. Each
//! registry read completes before the next output is looked at, since the
//! accumulated `seen` set and store state decide what later outputs do.
//!
//! ## Disconnect
//!
//! Without a journal every frame in the block yields a delete, whether or
//! not the connect pass put it. That can remove an entry an earlier block
//! created. With a journal only the names the block actually created are
//! deleted, once each.

use super::errors::IndexingError;
use super::frame::{decode_output, Frame};
use super::mutation::{MutationBatch, MutationOp};
use bitcoin::{Block, Transaction, Txid};
use shared_types::{ContentHash, Name};
use std::collections::HashSet;

/// Read access to registry state needed while planning a connect.
pub trait RegistryView {
    /// Current entry for `name`.
    fn entry(&self, name: &Name) -> Result<Option<ContentHash>, IndexingError>;

    /// Txid of the unconfirmed transaction that wrote `name`, if it is
    /// still awaiting confirmation.
    fn pending_txid(&self, name: &Name) -> Result<Option<Txid>, IndexingError>;
}

/// Result of planning a block connect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectPlan {
    /// Puts to apply, in block order.
    pub batch: MutationBatch,
    /// Names this block owns afterwards: every put plus every claim.
    pub created: Vec<Name>,
    /// Names already written by an unconfirmed transaction that this block
    /// confirms. Their pending markers are settled by the connect.
    pub claimed: Vec<Name>,
    /// Frames decoded from the block, including skipped ones.
    pub frame_count: usize,
}

/// Frames carried by a transaction, in output order.
pub fn transaction_frames(tx: &Transaction) -> impl Iterator<Item = Frame> + '_ {
    tx.output.iter().filter_map(decode_output)
}

/// Frames carried by a block, in transaction then output order.
pub fn block_frames(block: &Block) -> impl Iterator<Item = Frame> + '_ {
    block.txdata.iter().flat_map(transaction_frames)
}

/// Plan the mutations for connecting `block`.
///
/// Aborts on the first registry read failure; nothing is returned that
/// could be partially applied.
pub fn plan_connect<V: RegistryView + ?Sized>(
    block: &Block,
    view: &V,
) -> Result<ConnectPlan, IndexingError> {
    let mut plan = ConnectPlan::default();
    let mut seen: HashSet<Name> = HashSet::new();

    for tx in &block.txdata {
        let mut txid: Option<Txid> = None;

        for frame in transaction_frames(tx) {
            plan.frame_count += 1;
            if !seen.insert(frame.name) {
                continue;
            }

            match view.entry(&frame.name)? {
                None => {
                    plan.batch
                        .push(MutationOp::put(frame.name, frame.content_hash));
                    plan.created.push(frame.name);
                }
                Some(_) => {
                    let Some(pending) = view.pending_txid(&frame.name)? else {
                        continue;
                    };
                    let txid = *txid.get_or_insert_with(|| tx.compute_txid());
                    if pending == txid {
                        plan.claimed.push(frame.name);
                        plan.created.push(frame.name);
                    }
                }
            }
        }
    }

    Ok(plan)
}

/// Plan the mutations for disconnecting `block`.
///
/// `journal` is the list of names the block created when it was connected.
/// `None` falls back to deleting every frame in the block.
pub fn plan_disconnect(block: &Block, journal: Option<&[Name]>) -> MutationBatch {
    let mut batch = MutationBatch::new();

    match journal {
        None => {
            for frame in block_frames(block) {
                batch.push(MutationOp::delete(frame.name, frame.content_hash));
            }
        }
        Some(names) => {
            let mut owned: HashSet<Name> = names.iter().copied().collect();
            for frame in block_frames(block) {
                if owned.remove(&frame.name) {
                    batch.push(MutationOp::delete(frame.name, frame.content_hash));
                }
            }
        }
    }

    batch
}
