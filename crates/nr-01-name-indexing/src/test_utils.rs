//! Builders for blocks and transactions carrying registry frames, plus a
//! store with injectable failures.
//!
//! Enabled by the `test-utils` feature.

use crate::adapters::storage::InMemoryKVStore;
use crate::domain::errors::KVStoreError;
use crate::domain::frame::Frame;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use bitcoin::absolute::LockTime;
use bitcoin::block::{Header, Version as BlockVersion};
use bitcoin::hashes::Hash;
use bitcoin::script::PushBytesBuf;
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, Block, BlockHash, CompactTarget, OutPoint, ScriptBuf, Sequence, Transaction,
    TxIn, TxMerkleNode, TxOut, Txid, Witness,
};
use shared_types::{ContentHash, Name, CONTENT_HASH_LEN, NAME_LEN};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Parent hash of a chain's first block.
pub fn zero_block_hash() -> BlockHash {
    BlockHash::all_zeros()
}

/// Name filled with `byte`.
pub fn name(byte: u8) -> Name {
    Name::new([byte; NAME_LEN])
}

/// Content hash filled with `byte`.
pub fn content_hash(byte: u8) -> ContentHash {
    ContentHash::new([byte; CONTENT_HASH_LEN])
}

/// `OP_RETURN` output carrying `payload` as a single push.
pub fn data_output(payload: &[u8]) -> TxOut {
    let push = PushBytesBuf::try_from(payload.to_vec()).unwrap_or_default();
    TxOut {
        value: Amount::ZERO,
        script_pubkey: ScriptBuf::new_op_return(push),
    }
}

/// Output carrying a registry frame.
pub fn frame_output(name: Name, content_hash: ContentHash) -> TxOut {
    data_output(&Frame::new(name, content_hash).encode())
}

/// Transaction with a change-style output followed by one frame output per
/// entry. `seed` makes the txid unique.
pub fn frame_tx(seed: u8, frames: &[(Name, ContentHash)]) -> Transaction {
    let mut outputs = vec![TxOut {
        value: Amount::from_sat(50_000),
        script_pubkey: ScriptBuf::new(),
    }];
    outputs.extend(frames.iter().map(|(n, h)| frame_output(*n, *h)));
    raw_tx(seed, outputs)
}

/// Transaction spending a synthetic outpoint derived from `seed`.
pub fn raw_tx(seed: u8, output: Vec<TxOut>) -> Transaction {
    Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: Txid::from_byte_array([seed; 32]),
                vout: 0,
            },
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output,
    }
}

/// Block on top of `prev`. `nonce` makes the block hash unique.
pub fn make_block(prev: BlockHash, nonce: u32, txdata: Vec<Transaction>) -> Block {
    Block {
        header: Header {
            version: BlockVersion::ONE,
            prev_blockhash: prev,
            merkle_root: TxMerkleNode::all_zeros(),
            time: 1_700_000_000,
            bits: CompactTarget::from_consensus(0x207f_ffff),
            nonce,
        },
        txdata,
    }
}

/// Shared switches controlling a [`FailingKVStore`].
#[derive(Clone, Default, Debug)]
pub struct FaultSwitch {
    reads: Arc<AtomicBool>,
    writes: Arc<AtomicBool>,
}

impl FaultSwitch {
    pub fn fail_reads(&self, fail: bool) {
        self.reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.writes.store(fail, Ordering::SeqCst);
    }
}

/// In-memory store whose reads or writes can be made to fail at runtime.
#[derive(Default)]
pub struct FailingKVStore {
    inner: InMemoryKVStore,
    switch: FaultSwitch,
}

impl FailingKVStore {
    pub fn new() -> (Self, FaultSwitch) {
        let store = Self::default();
        let switch = store.switch.clone();
        (store, switch)
    }

    pub fn inner(&self) -> &InMemoryKVStore {
        &self.inner
    }

    fn check(flag: &AtomicBool) -> Result<(), KVStoreError> {
        if flag.load(Ordering::SeqCst) {
            return Err(KVStoreError::IOError {
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for FailingKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Self::check(&self.switch.reads)?;
        self.inner.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        Self::check(&self.switch.writes)?;
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        Self::check(&self.switch.writes)?;
        self.inner.delete(key)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        Self::check(&self.switch.writes)?;
        self.inner.atomic_batch_write(operations)
    }
}
