//! # Node Container
//!
//! Builds the running components in dependency order:
//!
//! 1. Validate configuration
//! 2. Open the registry store and spawn the single registry writer
//! 3. Connect to bitcoind
//! 4. Load or create the identity and assemble the naming service

use super::config::NodeConfig;
use crate::adapters::{open_registry_store, BitcoindRpc};
use crate::routes;
use crate::service::{NamingService, NodeService};
use crate::wiring::ChainFollower;
use anyhow::{Context, Result};
use axum::Router;
use nr_01_name_indexing::{
    spawn_registry_writer, NameIndexingService, RegistryHandle, DEFAULT_QUEUE_CAPACITY,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

pub struct NodeContainer {
    pub config: NodeConfig,
    pub registry: RegistryHandle,
    pub ledger: Arc<BitcoindRpc>,
    pub naming: Arc<NamingService>,
    writer_task: JoinHandle<()>,
}

impl NodeContainer {
    pub async fn build(config: NodeConfig) -> Result<Self> {
        config.validate().context("invalid configuration")?;

        let store = open_registry_store(&config.storage).context("opening registry store")?;
        let indexing = NameIndexingService::new(store, config.indexer);
        let (registry, writer_task) = spawn_registry_writer(indexing, DEFAULT_QUEUE_CAPACITY);
        info!(journal_disconnects = config.indexer.journal_disconnects, "Registry writer spawned");

        let ledger = Arc::new(BitcoindRpc::new(&config.ledger).context("creating bitcoind client")?);

        let naming = NamingService::bootstrap(
            registry.clone(),
            Arc::clone(&ledger),
            Arc::clone(&ledger),
            config.network.network,
        )
        .await
        .context("loading identity")?;

        Ok(Self {
            config,
            registry,
            ledger,
            naming: Arc::new(naming),
            writer_task,
        })
    }

    /// Every service's routes, mounted under its prefix.
    pub fn router(&self) -> Router {
        let services: [Arc<dyn NodeService>; 1] = [self.naming.clone()];
        routes::mount(&services)
    }

    pub fn chain_follower(&self) -> ChainFollower<BitcoindRpc, NamingService> {
        ChainFollower::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.naming),
            self.registry.clone(),
            self.config.ledger.start_height,
            self.config.ledger.poll_interval,
        )
    }

    /// Stop the services and wait for the registry writer to drain.
    pub async fn shutdown(self) {
        self.naming.stop().await;
        if let Err(e) = self.writer_task.await {
            tracing::error!(error = %e, "Registry writer task failed");
        }
    }
}
