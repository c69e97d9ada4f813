//! Store key layout.
//!
//! Every key lives under [`PREFIX`] so the registry can share a store with
//! other consumers. Names are hex, so they never contain `-` and cannot
//! collide with the fixed record keys below.

use bitcoin::BlockHash;
use shared_types::Name;

pub const PREFIX: &str = "NamingService";

/// `NamingService-<name>` -> hex content hash.
pub fn entry_key(name: &Name) -> String {
    format!("{PREFIX}-{}", name.to_hex())
}

/// `NamingService-privateKey` -> WIF identity key.
pub fn private_key_key() -> String {
    format!("{PREFIX}-privateKey")
}

/// `NamingService-pending-<name>` -> txid of the unconfirmed writer.
pub fn pending_key(name: &Name) -> String {
    format!("{PREFIX}-pending-{}", name.to_hex())
}

/// `NamingService-undo-<blockhash>` -> names the block created.
pub fn undo_key(block_hash: &BlockHash) -> String {
    format!("{PREFIX}-undo-{block_hash}")
}

/// `NamingService-undo-at-<height>` -> hash of the journaled block at `height`.
pub fn undo_height_key(height: u64) -> String {
    format!("{PREFIX}-undo-at-{height}")
}

/// `NamingService-tip` -> last indexed block.
pub fn tip_key() -> String {
    format!("{PREFIX}-tip")
}
