//! # Chain Follower
//!
//! Polls the ledger node and drives the service's block and transaction
//! hooks.
//!
//! ## One Poll
//!
//! ```text
//! indexed tip ──hash differs from best chain at tip height?──→ disconnect tip,
//!      │                                                       rewind, repeat
//!      ↓
//! connect tip+1 ..= best height, one block at a time, in order
//!      │
//!      ↓
//! unseen mempool transactions → transaction hook
//! ```
//!
//! The indexed tip is read back from the registry each step, so a restart
//! resumes where the last committed block left off.

use crate::adapters::ports::{ChainSource, LedgerError};
use crate::service::NodeService;
use bitcoin::Txid;
use nr_01_name_indexing::{ChainTip, IndexingError, RegistryHandle};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FollowerError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Indexing(#[from] IndexingError),
}

/// What one poll did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub disconnected: usize,
    pub connected: usize,
    pub unconfirmed: usize,
}

pub struct ChainFollower<C: ?Sized, S: ?Sized> {
    chain: Arc<C>,
    service: Arc<S>,
    registry: RegistryHandle,
    start_height: u64,
    poll_interval: Duration,
    seen_mempool: HashSet<Txid>,
}

impl<C, S> ChainFollower<C, S>
where
    C: ChainSource + ?Sized,
    S: NodeService + ?Sized,
{
    pub fn new(
        chain: Arc<C>,
        service: Arc<S>,
        registry: RegistryHandle,
        start_height: u64,
        poll_interval: Duration,
    ) -> Self {
        Self {
            chain,
            service,
            registry,
            start_height,
            poll_interval,
            seen_mempool: HashSet::new(),
        }
    }

    /// Poll until `shutdown` flips to true.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            start_height = self.start_height,
            interval_ms = self.poll_interval.as_millis() as u64,
            "Chain follower running"
        );

        loop {
            match self.poll_once().await {
                Ok(report) if report != PollReport::default() => {
                    debug!(?report, "Chain poll");
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Chain poll failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Chain follower stopped");
    }

    /// Rewind stale blocks, connect new ones, then feed the mempool.
    pub async fn poll_once(&mut self) -> Result<PollReport, FollowerError> {
        let mut report = PollReport::default();
        let best_height = self.chain.block_count().await?;

        let mut tip = self.rewind(best_height, &mut report).await?;

        let mut next = tip.map_or(self.start_height, |t| (t.height + 1).max(self.start_height));
        while next <= best_height {
            let hash = self.chain.block_hash(next).await?;
            let block = self.chain.block(&hash).await?;

            if let Some(t) = tip.filter(|t| t.height + 1 == next) {
                if block.header.prev_blockhash != t.hash {
                    // The best chain moved under us; the next poll rewinds.
                    break;
                }
            }

            self.service.block_handler(&block, next, true).await?;
            report.connected += 1;
            tip = Some(ChainTip {
                height: next,
                hash,
            });
            next += 1;
        }

        report.unconfirmed = self.feed_mempool().await?;
        Ok(report)
    }

    /// Disconnect indexed blocks that left the best chain.
    async fn rewind(
        &self,
        best_height: u64,
        report: &mut PollReport,
    ) -> Result<Option<ChainTip>, FollowerError> {
        loop {
            let Some(tip) = self.registry.tip().await? else {
                return Ok(None);
            };
            if tip.height < self.start_height {
                // Rewound past the first indexed block.
                return Ok(None);
            }
            if tip.height <= best_height && self.chain.block_hash(tip.height).await? == tip.hash {
                return Ok(Some(tip));
            }

            let stale = self.chain.block(&tip.hash).await?;
            info!(height = tip.height, hash = %tip.hash, "Disconnecting stale block");
            self.service.block_handler(&stale, tip.height, false).await?;
            report.disconnected += 1;
        }
    }

    async fn feed_mempool(&mut self) -> Result<usize, FollowerError> {
        let txids = self.chain.mempool_txids().await?;
        let current: HashSet<Txid> = txids.iter().copied().collect();
        self.seen_mempool.retain(|txid| current.contains(txid));

        let mut fed = 0;
        for txid in txids {
            if self.seen_mempool.contains(&txid) {
                continue;
            }
            if let Some(tx) = self.chain.mempool_transaction(&txid).await? {
                self.service.transaction_handler(&tx).await;
                fed += 1;
            }
            self.seen_mempool.insert(txid);
        }
        Ok(fed)
    }
}
