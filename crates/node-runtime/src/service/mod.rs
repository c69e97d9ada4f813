//! # Node Services
//!
//! The capability set a service exposes to the node: lifecycle hooks, HTTP
//! routes under its prefix, and block and transaction hooks driven by the
//! chain follower.

pub mod naming;

pub use naming::{NamingService, ROUTE_PREFIX};

use async_trait::async_trait;
use axum::Router;
use bitcoin::{Block, Transaction};
use nr_01_name_indexing::{IndexingError, MutationBatch};
use nr_02_registration::RegistrationError;
use thiserror::Error;

/// Service lifecycle errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("indexing failed: {0}")]
    Indexing(#[from] IndexingError),

    #[error("registration setup failed: {0}")]
    Registration(#[from] RegistrationError),
}

#[async_trait]
pub trait NodeService: Send + Sync {
    /// Path prefix the service's routes are mounted under.
    fn prefix(&self) -> &'static str;

    async fn start(&self) -> Result<(), ServiceError>;

    async fn stop(&self);

    fn routes(&self) -> Router;

    /// Apply (`is_add`) or revert a block at `height`.
    async fn block_handler(
        &self,
        block: &Block,
        height: u64,
        is_add: bool,
    ) -> Result<MutationBatch, IndexingError>;

    /// Observe an unconfirmed transaction. Failures are logged, never retried.
    async fn transaction_handler(&self, tx: &Transaction);
}
