//! Indexer bookkeeping records.

use bitcoin::BlockHash;
use serde::{Deserialize, Serialize};

/// The last block folded into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainTip {
    pub height: u64,
    pub hash: BlockHash,
}

/// Journals kept by default: about two days of blocks.
pub const DEFAULT_JOURNAL_DEPTH: u64 = 288;

/// Indexer behavior switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexerConfig {
    /// Record which names each block created and only delete those on
    /// disconnect. When off, disconnect deletes every frame in the block.
    pub journal_disconnects: bool,
    /// Blocks a journal is kept for before it is pruned. A reorg deeper
    /// than this falls back to the unconditional reverse pass. `0` keeps
    /// journals forever.
    pub journal_depth: u64,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            journal_disconnects: true,
            journal_depth: DEFAULT_JOURNAL_DEPTH,
        }
    }
}
