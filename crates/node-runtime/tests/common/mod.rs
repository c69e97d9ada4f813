//! Shared fakes for the runtime integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bitcoin::consensus::encode;
use bitcoin::hashes::Hash;
use bitcoin::{Address, Amount, Block, BlockHash, Network, Transaction, Txid};
use node_runtime::adapters::{ChainSource, LedgerError};
use node_runtime::NamingService;
use nr_01_name_indexing::test_utils::{make_block, zero_block_hash};
use nr_01_name_indexing::{spawn_registry_writer, IndexerConfig, NameIndexingService, RegistryHandle};
use nr_02_registration::{RegistrationError, SpendableOutput, TransactionBroadcaster, UtxoIndex};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// LEDGER (UTXO index + broadcaster)
// =============================================================================

#[derive(Default)]
pub struct LedgerState {
    pub utxos: Vec<SpendableOutput>,
    pub broadcasts: Vec<Vec<u8>>,
    pub watched: Vec<String>,
}

#[derive(Clone, Default)]
pub struct StubLedger {
    pub state: Arc<Mutex<LedgerState>>,
}

impl StubLedger {
    pub fn fund(&self, address: &Address, sats: u64) {
        let mut state = self.state.lock();
        let vout = state.utxos.len() as u32;
        state.utxos.push(SpendableOutput {
            txid: Txid::from_byte_array([0x5A; 32]),
            vout,
            amount: Amount::from_sat(sats),
            address: address.to_string(),
        });
    }

    pub fn broadcasts(&self) -> Vec<Transaction> {
        self.state
            .lock()
            .broadcasts
            .iter()
            .map(|raw| encode::deserialize(raw).unwrap())
            .collect()
    }
}

#[async_trait]
impl UtxoIndex for StubLedger {
    async fn unspent_outputs(
        &self,
        address: &Address,
        _include_mempool: bool,
    ) -> Result<Vec<SpendableOutput>, RegistrationError> {
        Ok(self
            .state
            .lock()
            .utxos
            .iter()
            .filter(|u| u.address == address.to_string())
            .cloned()
            .collect())
    }

    async fn watch(&self, address: &Address) -> Result<(), RegistrationError> {
        self.state.lock().watched.push(address.to_string());
        Ok(())
    }
}

#[async_trait]
impl TransactionBroadcaster for StubLedger {
    async fn broadcast(&self, raw_tx: &[u8]) -> Result<(), RegistrationError> {
        self.state.lock().broadcasts.push(raw_tx.to_vec());
        Ok(())
    }
}

// =============================================================================
// CHAIN (best chain + mempool)
// =============================================================================

pub struct ChainState {
    pub blocks: HashMap<BlockHash, Block>,
    pub best: Vec<BlockHash>,
    pub mempool: Vec<Transaction>,
    pub nonce: u32,
    pub offline: bool,
}

/// In-memory best chain starting at an empty genesis block.
#[derive(Clone)]
pub struct MockChain {
    pub state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    pub fn new() -> Self {
        let genesis = make_block(zero_block_hash(), 0, vec![]);
        let hash = genesis.block_hash();
        Self {
            state: Arc::new(Mutex::new(ChainState {
                blocks: HashMap::from([(hash, genesis)]),
                best: vec![hash],
                mempool: Vec::new(),
                nonce: 1,
                offline: false,
            })),
        }
    }

    pub fn height(&self) -> u64 {
        self.state.lock().best.len() as u64 - 1
    }

    pub fn hash_at(&self, height: u64) -> BlockHash {
        self.state.lock().best[height as usize]
    }

    /// Append a block carrying `txdata` to the best chain.
    pub fn mine(&self, txdata: Vec<Transaction>) -> Block {
        let mut state = self.state.lock();
        let prev = *state.best.last().unwrap();
        let block = make_block(prev, state.nonce, txdata);
        state.nonce += 1;
        let hash = block.block_hash();
        state.blocks.insert(hash, block.clone());
        state.best.push(hash);
        block
    }

    /// Drop every best-chain block above `height`. The blocks stay fetchable
    /// by hash, as stale blocks do on a real node.
    pub fn reorg_to(&self, height: u64) {
        self.state.lock().best.truncate(height as usize + 1);
    }

    pub fn set_mempool(&self, txs: Vec<Transaction>) {
        self.state.lock().mempool = txs;
    }

    fn check_online(&self) -> Result<(), LedgerError> {
        if self.state.lock().offline {
            return Err(LedgerError::Transport("connection refused".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainSource for MockChain {
    async fn block_count(&self) -> Result<u64, LedgerError> {
        self.check_online()?;
        Ok(self.height())
    }

    async fn block_hash(&self, height: u64) -> Result<BlockHash, LedgerError> {
        self.check_online()?;
        self.state
            .lock()
            .best
            .get(height as usize)
            .copied()
            .ok_or(LedgerError::Rpc {
                code: -8,
                message: "Block height out of range".into(),
            })
    }

    async fn block(&self, hash: &BlockHash) -> Result<Block, LedgerError> {
        self.check_online()?;
        self.state
            .lock()
            .blocks
            .get(hash)
            .cloned()
            .ok_or(LedgerError::Rpc {
                code: -5,
                message: "Block not found".into(),
            })
    }

    async fn mempool_txids(&self) -> Result<Vec<Txid>, LedgerError> {
        self.check_online()?;
        Ok(self.state.lock().mempool.iter().map(|tx| tx.compute_txid()).collect())
    }

    async fn mempool_transaction(&self, txid: &Txid) -> Result<Option<Transaction>, LedgerError> {
        self.check_online()?;
        Ok(self
            .state
            .lock()
            .mempool
            .iter()
            .find(|tx| tx.compute_txid() == *txid)
            .cloned())
    }
}

// =============================================================================
// NODE
// =============================================================================

pub struct TestNode {
    pub naming: Arc<NamingService>,
    pub registry: RegistryHandle,
    pub ledger: StubLedger,
}

/// Naming service over an in-memory registry and a stub ledger.
pub async fn test_node(config: IndexerConfig) -> TestNode {
    let (registry, _task) = spawn_registry_writer(NameIndexingService::new_in_memory(config), 16);
    let ledger = StubLedger::default();
    let naming = NamingService::bootstrap(
        registry.clone(),
        ledger.clone(),
        ledger.clone(),
        Network::Regtest,
    )
    .await
    .unwrap();

    TestNode {
        naming: Arc::new(naming),
        registry,
        ledger,
    }
}
