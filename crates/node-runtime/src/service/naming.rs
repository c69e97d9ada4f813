//! # Naming Service
//!
//! Binds the registry writer (nr-01) and registration (nr-02) into one
//! node service mounted at `/namingService`.

use super::{NodeService, ServiceError};
use crate::routes;
use async_trait::async_trait;
use axum::Router;
use bitcoin::{Block, Network, Transaction};
use nr_01_name_indexing::{IndexingError, MutationBatch, RegistryHandle};
use nr_02_registration::{
    load_or_create_identity, RegistrationApi, RegistrationService, TransactionBroadcaster,
    UtxoIndex,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const ROUTE_PREFIX: &str = "namingService";

pub struct NamingService {
    registry: RegistryHandle,
    api: Arc<dyn RegistrationApi>,
}

impl NamingService {
    pub fn new(registry: RegistryHandle, api: Arc<dyn RegistrationApi>) -> Self {
        Self { registry, api }
    }

    /// Load or create the identity, have the UTXO index watch its address
    /// and assemble the service.
    pub async fn bootstrap<U, B>(
        registry: RegistryHandle,
        utxos: U,
        broadcaster: B,
        network: Network,
    ) -> Result<Self, ServiceError>
    where
        U: UtxoIndex + 'static,
        B: TransactionBroadcaster + 'static,
    {
        let identity = load_or_create_identity(&registry, network).await?;
        utxos.watch(identity.address()).await?;
        let api = RegistrationService::new(identity, registry.clone(), utxos, broadcaster);
        Ok(Self::new(registry, Arc::new(api)))
    }

    pub fn api(&self) -> &Arc<dyn RegistrationApi> {
        &self.api
    }
}

#[async_trait]
impl NodeService for NamingService {
    fn prefix(&self) -> &'static str {
        ROUTE_PREFIX
    }

    async fn start(&self) -> Result<(), ServiceError> {
        let tip = self.registry.tip().await?;
        info!(
            address = %self.api.funding_address(),
            tip_height = tip.map(|t| t.height),
            "Naming service started"
        );
        Ok(())
    }

    async fn stop(&self) {
        self.registry.shutdown().await;
        info!("Naming service stopped");
    }

    fn routes(&self) -> Router {
        routes::router(Arc::clone(&self.api))
    }

    async fn block_handler(
        &self,
        block: &Block,
        height: u64,
        is_add: bool,
    ) -> Result<MutationBatch, IndexingError> {
        if is_add {
            self.registry.connect_block(block.clone(), height).await
        } else {
            self.registry.disconnect_block(block.clone(), height).await
        }
    }

    async fn transaction_handler(&self, tx: &Transaction) {
        let txid = tx.compute_txid();
        match self.registry.handle_unconfirmed(tx.clone()).await {
            Ok(written) => debug!(%txid, written, "Indexed unconfirmed transaction"),
            Err(e) => warn!(%txid, error = %e, "Dropped unconfirmed transaction"),
        }
    }
}
