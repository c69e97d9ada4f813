//! # Registry Storage Backends
//!
//! The file-backed store is always available. Enable the `rocksdb` feature
//! to store the registry in RocksDB instead:
//!
//! ```toml
//! node-runtime = { path = "...", features = ["rocksdb"] }
//! ```

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

use crate::container::config::StorageConfig;
use nr_01_name_indexing::{KVStoreError, KeyValueStore};
use tracing::info;

/// File name of the file-backed registry under the data directory.
pub const REGISTRY_FILE: &str = "registry.db";

/// Directory name of the RocksDB registry under the data directory.
pub const ROCKSDB_DIR: &str = "registry-rocksdb";

/// Open the registry store selected at build time.
pub fn open_registry_store(config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, KVStoreError> {
    std::fs::create_dir_all(&config.data_dir).map_err(|e| KVStoreError::IOError {
        message: format!("cannot create {}: {}", config.data_dir.display(), e),
    })?;

    #[cfg(feature = "rocksdb")]
    {
        let path = config.data_dir.join(ROCKSDB_DIR);
        info!(path = %path.display(), "Opening RocksDB registry store");
        Ok(Box::new(RocksDbStore::open_default(path)?))
    }

    #[cfg(not(feature = "rocksdb"))]
    {
        let path = config.data_dir.join(REGISTRY_FILE);
        info!(path = %path.display(), "Opening file-backed registry store");
        Ok(Box::new(nr_01_name_indexing::FileBackedKVStore::open(path)?))
    }
}
