//! `BitcoindRpc` against a local JSON-RPC server standing in for bitcoind.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use bitcoin::consensus::encode;
use bitcoin::{Address, Amount, Network};
use node_runtime::adapters::{BitcoindRpc, ChainSource, LedgerError};
use node_runtime::container::config::LedgerConfig;
use nr_01_name_indexing::test_utils::{content_hash, frame_tx, make_block, name, zero_block_hash};
use nr_02_registration::{Identity, RegistrationError, TransactionBroadcaster, UtxoIndex};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Default)]
struct NodeState {
    calls: Vec<(String, Value)>,
    authorized: Vec<bool>,
}

type Shared = Arc<Mutex<NodeState>>;

const REJECTED_ADDRESS: &str = "mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn";

fn rpc_error(code: i64, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"result": null, "error": {"code": code, "message": message}, "id": 0})),
    )
}

fn rpc_result(result: Value) -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({"result": result, "error": null, "id": 0})))
}

async fn handle(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let params = request["params"].clone();
    {
        let mut state = state.lock();
        state.authorized.push(headers.contains_key("authorization"));
        state.calls.push((method.clone(), params.clone()));
    }

    match method.as_str() {
        "getblockcount" => rpc_result(json!(2)),
        "getblockhash" => {
            let block = make_block(zero_block_hash(), params[0].as_u64().unwrap() as u32, vec![]);
            rpc_result(json!(block.block_hash().to_string()))
        }
        "getblock" => {
            let block = make_block(
                zero_block_hash(),
                7,
                vec![frame_tx(1, &[(name(1), content_hash(1))])],
            );
            rpc_result(json!(hex::encode(encode::serialize(&block))))
        }
        "getrawmempool" => rpc_result(json!([])),
        "getrawtransaction" => rpc_error(-5, "No such mempool or blockchain transaction"),
        "listunspent" => rpc_result(json!([{
            "txid": "11".repeat(32),
            "vout": 1,
            "address": "mipcBbFg9gMiCh81Kj8tqqdgoZub1ZJRfn",
            "amount": 0.001,
            "confirmations": 0
        }])),
        "getdescriptorinfo" => {
            let desc = params[0].as_str().unwrap_or_default();
            rpc_result(json!({"descriptor": format!("{}#abcd1234", desc), "checksum": "abcd1234"}))
        }
        "importdescriptors" => {
            let desc = params[0][0]["desc"].as_str().unwrap_or_default();
            if desc.contains(REJECTED_ADDRESS) {
                rpc_result(json!([{"success": false, "error": {"code": -4, "message": "Wallet is locked"}}]))
            } else {
                rpc_result(json!([{"success": true, "warnings": []}]))
            }
        }
        "sendrawtransaction" => rpc_error(-26, "min relay fee not met"),
        _ => rpc_error(-32601, "Method not found"),
    }
}

async fn spawn_node() -> (BitcoindRpc, Shared) {
    let state = Shared::default();
    let app = Router::new()
        .route("/", post(handle))
        .with_state(Arc::clone(&state));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = LedgerConfig {
        rpc_url: format!("http://{}/", addr),
        rpc_user: Some("rpc".into()),
        rpc_password: Some("secret".into()),
        ..LedgerConfig::default()
    };
    (BitcoindRpc::new(&config).unwrap(), state)
}

fn regtest_address() -> Address {
    Identity::generate(Network::Regtest).address().clone()
}

#[tokio::test]
async fn test_block_reads_decode() {
    let (rpc, state) = spawn_node().await;

    assert_eq!(rpc.block_count().await.unwrap(), 2);
    let hash = rpc.block_hash(1).await.unwrap();
    assert_eq!(hash, make_block(zero_block_hash(), 1, vec![]).block_hash());

    let block = rpc.block(&hash).await.unwrap();
    assert_eq!(block.txdata.len(), 1);

    let state = state.lock();
    assert_eq!(state.calls[2].0, "getblock");
    assert_eq!(state.calls[2].1[1], json!(0));
    assert!(state.authorized.iter().all(|a| *a));
}

#[tokio::test]
async fn test_unspent_outputs_include_mempool() {
    let (rpc, state) = spawn_node().await;

    let outputs = rpc.unspent_outputs(&regtest_address(), true).await.unwrap();

    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].amount, Amount::from_sat(100_000));
    assert_eq!(outputs[0].vout, 1);
    let (method, params) = state.lock().calls[0].clone();
    assert_eq!(method, "listunspent");
    assert_eq!(params[0], json!(0));
}

#[tokio::test]
async fn test_watch_imports_checksummed_descriptor() {
    let (rpc, state) = spawn_node().await;
    let address = regtest_address();

    rpc.watch(&address).await.unwrap();

    let calls = state.lock().calls.clone();
    assert_eq!(calls[0].0, "getdescriptorinfo");
    assert_eq!(calls[0].1[0], json!(format!("addr({})", address)));
    assert_eq!(calls[1].0, "importdescriptors");
    assert_eq!(
        calls[1].1[0][0]["desc"],
        json!(format!("addr({})#abcd1234", address))
    );
    assert_eq!(calls[1].1[0][0]["timestamp"], json!("now"));
}

#[tokio::test]
async fn test_failed_import_is_ledger_error() {
    let (rpc, _state) = spawn_node().await;
    let address: Address = REJECTED_ADDRESS
        .parse::<Address<bitcoin::address::NetworkUnchecked>>()
        .unwrap()
        .assume_checked();

    let result = rpc.watch(&address).await;

    assert!(matches!(result, Err(RegistrationError::Ledger(msg)) if msg.contains("Wallet is locked")));
}

#[tokio::test]
async fn test_missing_mempool_transaction_is_none() {
    let (rpc, _state) = spawn_node().await;
    let txid = frame_tx(9, &[]).compute_txid();

    assert_eq!(rpc.mempool_transaction(&txid).await.unwrap(), None);
    assert!(rpc.mempool_txids().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_broadcast_rejection_is_broadcast_error() {
    let (rpc, _state) = spawn_node().await;

    let result = rpc.broadcast(&[0x02, 0x00]).await;

    assert!(matches!(result, Err(RegistrationError::BroadcastError(msg)) if msg.contains("min relay fee")));
}

#[tokio::test]
async fn test_unreachable_node_is_transport_error() {
    let config = LedgerConfig {
        rpc_url: "http://127.0.0.1:1/".into(),
        ..LedgerConfig::default()
    };
    let rpc = BitcoindRpc::new(&config).unwrap();

    assert!(matches!(
        rpc.block_count().await,
        Err(LedgerError::Transport(_))
    ));
}
