//! # Node Configuration
//!
//! Plain configuration structs with defaults, overridden from `NR_*`
//! environment variables by [`load_config`].

use bitcoin::Network;
use nr_01_name_indexing::IndexerConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Bitcoin network the identity and addresses belong to.
    pub network: NetworkConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// bitcoind connection and polling.
    pub ledger: LedgerConfig,
    /// HTTP API configuration.
    pub api: ApiConfig,
    /// Indexer behavior.
    pub indexer: IndexerConfig,
}

impl NodeConfig {
    /// Reject settings the node cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger.rpc_url.trim().is_empty() {
            return Err(ConfigError::MissingRpcUrl);
        }
        if self.ledger.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Apply overrides from `var`, a lookup over environment variable names.
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(network) = var("NR_NETWORK") {
            match network.parse::<Network>() {
                Ok(n) => self.network.network = n,
                Err(_) => warn!(%network, "NR_NETWORK is not a known network"),
            }
        }
        if let Some(dir) = var("NR_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(port) = var("NR_HTTP_PORT") {
            match port.parse() {
                Ok(p) => self.api.http_port = p,
                Err(_) => warn!(%port, "NR_HTTP_PORT is not a port number"),
            }
        }
        if let Some(url) = var("NR_BITCOIND_URL") {
            self.ledger.rpc_url = url;
        }
        if let Some(user) = var("NR_BITCOIND_USER") {
            self.ledger.rpc_user = Some(user);
        }
        if let Some(password) = var("NR_BITCOIND_PASSWORD") {
            self.ledger.rpc_password = Some(password);
        }
        if let Some(ms) = var("NR_POLL_INTERVAL_MS") {
            match ms.parse() {
                Ok(ms) => self.ledger.poll_interval = Duration::from_millis(ms),
                Err(_) => warn!(%ms, "NR_POLL_INTERVAL_MS is not a number"),
            }
        }
        if let Some(height) = var("NR_START_HEIGHT") {
            match height.parse() {
                Ok(h) => self.ledger.start_height = h,
                Err(_) => warn!(%height, "NR_START_HEIGHT is not a block height"),
            }
        }
        if let Some(flag) = var("NR_JOURNAL_DISCONNECTS") {
            match flag.parse() {
                Ok(b) => self.indexer.journal_disconnects = b,
                Err(_) => warn!(%flag, "NR_JOURNAL_DISCONNECTS must be true or false"),
            }
        }
        if let Some(depth) = var("NR_JOURNAL_DEPTH") {
            match depth.parse() {
                Ok(d) => self.indexer.journal_depth = d,
                Err(_) => warn!(%depth, "NR_JOURNAL_DEPTH is not a block count"),
            }
        }
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.apply_overrides(|name| std::env::var(name).ok());
    info!(
        network = %config.network.network,
        data_dir = %config.storage.data_dir.display(),
        http_port = config.api.http_port,
        "Loaded configuration"
    );
    config
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("bitcoind RPC URL is empty; set NR_BITCOIND_URL")]
    MissingRpcUrl,

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}

/// Network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    pub network: Network,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network: Network::Testnet,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the registry store.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// bitcoind connection configuration.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
    /// Delay between chain polls.
    pub poll_interval: Duration,
    /// First height indexed on a fresh store.
    pub start_height: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:18332".to_string(),
            rpc_user: None,
            rpc_password: None,
            poll_interval: Duration::from_millis(2000),
            start_height: 0,
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_address: [u8; 4],
    pub http_port: u16,
}

impl ApiConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::from((self.bind_address, self.http_port))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: [127, 0, 0, 1],
            http_port: 3001,
        }
    }
}
