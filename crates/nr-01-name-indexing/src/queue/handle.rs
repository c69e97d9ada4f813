//! Cloneable handle to the registry writer.

use super::actor::RegistryCommand;
use crate::domain::entities::ChainTip;
use crate::domain::errors::IndexingError;
use crate::domain::mutation::MutationBatch;
use bitcoin::{Block, Transaction};
use shared_types::{ContentHash, Name};
use tokio::sync::{mpsc, oneshot};

#[derive(Clone, Debug)]
pub struct RegistryHandle {
    tx: mpsc::Sender<RegistryCommand>,
}

impl RegistryHandle {
    pub fn new(tx: mpsc::Sender<RegistryCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, IndexingError>>) -> RegistryCommand,
    ) -> Result<T, IndexingError> {
        let (resp, rx) = oneshot::channel();
        self.tx
            .send(make(resp))
            .await
            .map_err(|_| IndexingError::QueueClosed)?;
        rx.await.map_err(|_| IndexingError::QueueClosed)?
    }

    /// Index a connected block; returns the applied puts.
    pub async fn connect_block(
        &self,
        block: Block,
        height: u64,
    ) -> Result<MutationBatch, IndexingError> {
        self.request(|resp| RegistryCommand::ConnectBlock {
            block: Box::new(block),
            height,
            resp,
        })
        .await
    }

    /// Reverse a disconnected block; returns the applied deletes.
    pub async fn disconnect_block(
        &self,
        block: Block,
        height: u64,
    ) -> Result<MutationBatch, IndexingError> {
        self.request(|resp| RegistryCommand::DisconnectBlock {
            block: Box::new(block),
            height,
            resp,
        })
        .await
    }

    pub async fn handle_unconfirmed(&self, tx: Transaction) -> Result<usize, IndexingError> {
        self.request(|resp| RegistryCommand::Unconfirmed {
            tx: Box::new(tx),
            resp,
        })
        .await
    }

    pub async fn lookup(&self, name: Name) -> Result<Option<ContentHash>, IndexingError> {
        self.request(|resp| RegistryCommand::Lookup { name, resp })
            .await
    }

    pub async fn tip(&self) -> Result<Option<ChainTip>, IndexingError> {
        self.request(|resp| RegistryCommand::Tip { resp }).await
    }

    pub async fn identity_key(&self) -> Result<Option<String>, IndexingError> {
        self.request(|resp| RegistryCommand::IdentityKey { resp })
            .await
    }

    pub async fn store_identity_key(&self, wif: String) -> Result<(), IndexingError> {
        self.request(|resp| RegistryCommand::StoreIdentityKey { wif, resp })
            .await
    }

    /// Ask the writer to stop after the commands already queued.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(RegistryCommand::Shutdown).await;
    }
}
