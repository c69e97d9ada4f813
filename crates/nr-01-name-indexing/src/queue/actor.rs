//! Registry writer actor: owns the indexing service and processes commands
//! one at a time on a blocking worker.

use super::handle::RegistryHandle;
use crate::domain::entities::ChainTip;
use crate::domain::errors::IndexingError;
use crate::domain::mutation::MutationBatch;
use crate::ports::inbound::NameIndexingApi;
use bitcoin::{Block, Transaction};
use shared_types::{ContentHash, Name};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

type Reply<T> = oneshot::Sender<Result<T, IndexingError>>;

/// Commands sent to the registry writer.
pub enum RegistryCommand {
    ConnectBlock {
        block: Box<Block>,
        height: u64,
        resp: Reply<MutationBatch>,
    },
    DisconnectBlock {
        block: Box<Block>,
        height: u64,
        resp: Reply<MutationBatch>,
    },
    Unconfirmed {
        tx: Box<Transaction>,
        resp: Reply<usize>,
    },
    Lookup {
        name: Name,
        resp: Reply<Option<ContentHash>>,
    },
    Tip {
        resp: Reply<Option<ChainTip>>,
    },
    IdentityKey {
        resp: Reply<Option<String>>,
    },
    StoreIdentityKey {
        wif: String,
        resp: Reply<()>,
    },
    Shutdown,
}

/// Single owner of the registry.
pub struct RegistryWriter<A> {
    service: A,
    rx: mpsc::Receiver<RegistryCommand>,
}

impl<A: NameIndexingApi> RegistryWriter<A> {
    pub fn new(service: A, rx: mpsc::Receiver<RegistryCommand>) -> Self {
        Self { service, rx }
    }

    /// Process commands until `Shutdown` or until every handle is dropped.
    /// Blocks the calling thread.
    pub fn run_blocking(mut self) {
        while let Some(cmd) = self.rx.blocking_recv() {
            if !self.handle(cmd) {
                break;
            }
        }
        info!("[nr-01] Registry writer stopped");
    }

    /// Returns `false` on shutdown.
    fn handle(&mut self, cmd: RegistryCommand) -> bool {
        // A dropped reply receiver means the caller gave up; the work is
        // still done so the store stays in step with the chain.
        match cmd {
            RegistryCommand::ConnectBlock {
                block,
                height,
                resp,
            } => {
                let _ = resp.send(self.service.connect_block(&block, height));
            }
            RegistryCommand::DisconnectBlock {
                block,
                height,
                resp,
            } => {
                let _ = resp.send(self.service.disconnect_block(&block, height));
            }
            RegistryCommand::Unconfirmed { tx, resp } => {
                let _ = resp.send(self.service.handle_unconfirmed(&tx));
            }
            RegistryCommand::Lookup { name, resp } => {
                let _ = resp.send(self.service.lookup(&name));
            }
            RegistryCommand::Tip { resp } => {
                let _ = resp.send(self.service.tip());
            }
            RegistryCommand::IdentityKey { resp } => {
                let _ = resp.send(self.service.identity_key());
            }
            RegistryCommand::StoreIdentityKey { wif, resp } => {
                let _ = resp.send(self.service.store_identity_key(&wif));
            }
            RegistryCommand::Shutdown => {
                debug!("[nr-01] Registry writer received shutdown");
                return false;
            }
        }
        true
    }
}

/// Start a writer for `service` on the blocking pool of the current tokio
/// runtime.
pub fn spawn_registry_writer<A>(service: A, capacity: usize) -> (RegistryHandle, JoinHandle<()>)
where
    A: NameIndexingApi + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let writer = RegistryWriter::new(service, rx);
    let task = tokio::task::spawn_blocking(move || writer.run_blocking());
    info!(capacity, "[nr-01] Registry writer started");
    (RegistryHandle::new(tx), task)
}
