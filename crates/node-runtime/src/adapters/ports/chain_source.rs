//! # Chain Source Port
//!
//! Read access to the best chain and mempool, as needed by the chain
//! follower. Implemented by `BitcoindRpc`.

use async_trait::async_trait;
use bitcoin::{Block, BlockHash, Transaction, Txid};
use thiserror::Error;

/// Failures talking to the ledger node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger transport failed: {0}")]
    Transport(String),

    #[error("ledger RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("ledger returned undecodable data: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Height of the best block.
    async fn block_count(&self) -> Result<u64, LedgerError>;

    /// Hash of the best-chain block at `height`.
    async fn block_hash(&self, height: u64) -> Result<BlockHash, LedgerError>;

    async fn block(&self, hash: &BlockHash) -> Result<Block, LedgerError>;

    async fn mempool_txids(&self) -> Result<Vec<Txid>, LedgerError>;

    /// A mempool transaction. `None` once it has left the mempool.
    async fn mempool_transaction(&self, txid: &Txid) -> Result<Option<Transaction>, LedgerError>;
}
