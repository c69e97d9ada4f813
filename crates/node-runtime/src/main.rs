//! # Naming Node
//!
//! Indexes name registrations carried in Bitcoin data-only outputs and
//! serves lookups and registrations over HTTP.
//!
//! ## Flow
//!
//! ```text
//! bitcoind ──poll──→ ChainFollower ──blocks / mempool txs──→ NamingService
//!                                                               │
//!                                                   RegistryHandle (queue)
//!                                                               │
//!                                                    RegistryWriter ──→ store
//!                                                               ↑
//! HTTP /namingService/... ──→ RegistrationService ──lookups─────┘
//!                                   │
//!                                   └──sendrawtransaction──→ bitcoind
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `NR_*` environment variables
//! 2. Open the registry store and spawn the registry writer
//! 3. Load or create the identity key
//! 4. Start the naming service, the chain follower and the HTTP server

use anyhow::{Context, Result};
use node_runtime::{load_config, NodeConfig, NodeContainer, NodeService};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// The running node.
struct NodeRuntime {
    container: NodeContainer,
    shutdown_tx: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    /// Build every component and start the background tasks.
    async fn start(config: NodeConfig) -> Result<Self> {
        let container = NodeContainer::build(config).await?;
        container.naming.start().await?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut tasks = Vec::new();

        let follower = container.chain_follower();
        tasks.push(tokio::spawn(follower.run(shutdown_rx.clone())));

        let addr = container.config.api.socket_addr();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding HTTP server to {}", addr))?;
        let router = container.router();
        let mut http_shutdown = shutdown_rx;
        tasks.push(tokio::spawn(async move {
            info!(%addr, "HTTP server listening");
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = http_shutdown.wait_for(|stop| *stop).await;
                })
                .await;
            if let Err(e) = served {
                error!(error = %e, "HTTP server error");
            }
        }));

        Ok(Self {
            container,
            shutdown_tx,
            tasks,
        })
    }

    /// Graceful shutdown:
    ///
    /// 1. Signal the follower and HTTP server
    /// 2. Wait for them to finish
    /// 3. Stop the services and drain the registry writer
    async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                error!(error = %e, "Background task failed");
            }
        }

        self.container.shutdown().await;
        info!("Shutdown complete");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config();
    let runtime = NodeRuntime::start(config).await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    runtime.shutdown().await;
    Ok(())
}
