//! # bitcoind JSON-RPC Adapter
//!
//! Talks JSON-RPC 1.0 over HTTP to a bitcoind instance.
//!
//! ## Ports Implemented
//!
//! - `UtxoIndex` (nr-02) - `listunspent` with `minconf = 0`; the identity
//!   address is imported into the wallet as a watch-only descriptor, since
//!   `listunspent` only reports addresses the wallet tracks
//! - `TransactionBroadcaster` (nr-02) - `sendrawtransaction`
//! - `ChainSource` - block and mempool reads for the chain follower

use crate::adapters::ports::{ChainSource, LedgerError};
use crate::container::config::LedgerConfig;
use async_trait::async_trait;
use bitcoin::consensus::encode;
use bitcoin::{Address, Amount, Block, BlockHash, Transaction, Txid};
use nr_02_registration::{RegistrationError, SpendableOutput, TransactionBroadcaster, UtxoIndex};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// bitcoind's "no such mempool or blockchain transaction" error code.
pub const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;

const MAX_CONFIRMATIONS: u32 = 9_999_999;

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct UnspentEntry {
    txid: Txid,
    vout: u32,
    #[serde(default)]
    address: Option<String>,
    #[serde(with = "bitcoin::amount::serde::as_btc")]
    amount: Amount,
}

#[derive(Debug, Deserialize)]
struct DescriptorInfo {
    descriptor: String,
}

#[derive(Debug, Deserialize)]
struct ImportResult {
    success: bool,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

/// Decode a JSON-RPC reply body into `T`.
fn decode_response<T: DeserializeOwned>(body: RpcResponse) -> Result<T, LedgerError> {
    if let Some(error) = body.error {
        return Err(LedgerError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    serde_json::from_value(body.result).map_err(|e| LedgerError::Decode(e.to_string()))
}

fn decode_hex<T: encode::Decodable>(hex_str: &str) -> Result<T, LedgerError> {
    let bytes = hex::decode(hex_str).map_err(|e| LedgerError::Decode(e.to_string()))?;
    encode::deserialize(&bytes).map_err(|e| LedgerError::Decode(e.to_string()))
}

/// JSON-RPC client for bitcoind.
#[derive(Debug)]
pub struct BitcoindRpc {
    url: String,
    auth: Option<(String, Option<String>)>,
    client: Client,
    next_id: AtomicU64,
}

impl BitcoindRpc {
    pub fn new(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        Ok(Self {
            url: config.rpc_url.clone(),
            auth: config
                .rpc_user
                .clone()
                .map(|user| (user, config.rpc_password.clone())),
            client,
            next_id: AtomicU64::new(0),
        })
    }

    /// Issue one JSON-RPC call.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, LedgerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "1.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let mut request = self.client.post(&self.url).json(&body);
        if let Some((user, password)) = &self.auth {
            request = request.basic_auth(user, password.as_ref());
        }

        // RPC errors arrive with a non-2xx status and a JSON body.
        let response = request
            .send()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LedgerError::Transport(e.to_string()))?;

        debug!(method, %status, "bitcoind RPC call");

        match serde_json::from_str::<RpcResponse>(&text) {
            Ok(reply) => decode_response(reply),
            Err(_) if !status.is_success() => {
                Err(LedgerError::Transport(format!("{} {}", status, text)))
            }
            Err(e) => Err(LedgerError::Decode(e.to_string())),
        }
    }

    /// Unspent outputs paying `address` with at least `min_conf` confirmations.
    pub async fn list_unspent(
        &self,
        address: &Address,
        min_conf: u32,
    ) -> Result<Vec<SpendableOutput>, LedgerError> {
        let entries: Vec<UnspentEntry> = self
            .call(
                "listunspent",
                json!([min_conf, MAX_CONFIRMATIONS, [address.to_string()]]),
            )
            .await?;

        Ok(entries
            .into_iter()
            .map(|entry| SpendableOutput {
                txid: entry.txid,
                vout: entry.vout,
                amount: entry.amount,
                address: entry.address.unwrap_or_else(|| address.to_string()),
            })
            .collect())
    }

    /// Import `address` into the wallet as a watch-only `addr()` descriptor.
    /// Scanning starts at the current tip.
    pub async fn import_watch_only(&self, address: &Address) -> Result<(), LedgerError> {
        let info: DescriptorInfo = self
            .call("getdescriptorinfo", json!([format!("addr({})", address)]))
            .await?;
        let results: Vec<ImportResult> = self
            .call(
                "importdescriptors",
                json!([[{ "desc": info.descriptor, "timestamp": "now" }]]),
            )
            .await?;

        match results.into_iter().find(|r| !r.success) {
            Some(failed) => Err(match failed.error {
                Some(error) => LedgerError::Rpc {
                    code: error.code,
                    message: error.message,
                },
                None => LedgerError::Decode("importdescriptors reported failure".into()),
            }),
            None => {
                debug!(%address, "Watch-only address imported");
                Ok(())
            }
        }
    }

    pub async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<Txid, LedgerError> {
        self.call("sendrawtransaction", json!([hex::encode(raw_tx)]))
            .await
    }
}

#[async_trait]
impl UtxoIndex for BitcoindRpc {
    async fn unspent_outputs(
        &self,
        address: &Address,
        include_mempool: bool,
    ) -> Result<Vec<SpendableOutput>, RegistrationError> {
        let min_conf = if include_mempool { 0 } else { 1 };
        self.list_unspent(address, min_conf)
            .await
            .map_err(|e| RegistrationError::Ledger(e.to_string()))
    }

    async fn watch(&self, address: &Address) -> Result<(), RegistrationError> {
        self.import_watch_only(address)
            .await
            .map_err(|e| RegistrationError::Ledger(e.to_string()))
    }
}

#[async_trait]
impl TransactionBroadcaster for BitcoindRpc {
    async fn broadcast(&self, raw_tx: &[u8]) -> Result<(), RegistrationError> {
        self.send_raw_transaction(raw_tx)
            .await
            .map(|_| ())
            .map_err(|e| RegistrationError::BroadcastError(e.to_string()))
    }
}

#[async_trait]
impl ChainSource for BitcoindRpc {
    async fn block_count(&self) -> Result<u64, LedgerError> {
        self.call("getblockcount", json!([])).await
    }

    async fn block_hash(&self, height: u64) -> Result<BlockHash, LedgerError> {
        self.call("getblockhash", json!([height])).await
    }

    async fn block(&self, hash: &BlockHash) -> Result<Block, LedgerError> {
        let raw: String = self.call("getblock", json!([hash.to_string(), 0])).await?;
        decode_hex(&raw)
    }

    async fn mempool_txids(&self) -> Result<Vec<Txid>, LedgerError> {
        self.call("getrawmempool", json!([])).await
    }

    async fn mempool_transaction(&self, txid: &Txid) -> Result<Option<Transaction>, LedgerError> {
        match self
            .call::<String>("getrawtransaction", json!([txid.to_string(), false]))
            .await
        {
            Ok(raw) => decode_hex(&raw).map(Some),
            Err(LedgerError::Rpc { code, .. }) if code == RPC_INVALID_ADDRESS_OR_KEY => Ok(None),
            Err(e) => Err(e),
        }
    }
}
