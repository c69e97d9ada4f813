//! # Adapter Implementations
//!
//! Concrete implementations of the ports the naming subsystems depend on.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    OUTER LAYER (Adapters)                  │
//! │   BitcoindRpc            FileBackedKVStore / RocksDbStore  │
//! └──────────┬───────────────────────────┬────────────────────┘
//!            ↓ implements                ↓ implements
//! ┌──────────────────────────┐ ┌───────────────────────────────┐
//! │ UtxoIndex, Broadcaster   │ │ KeyValueStore (nr-01)          │
//! │ (nr-02), ChainSource     │ │                                │
//! └──────────────────────────┘ └───────────────────────────────┘
//! ```

pub mod bitcoind;
pub mod ports;
pub mod storage;

pub use bitcoind::BitcoindRpc;
pub use ports::{ChainSource, LedgerError};
pub use storage::open_registry_store;
