//! # Node Runtime Library
//!
//! This library exposes the internal modules of the naming node for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Modular Structure
//!
//! - `container/` - Configuration and component assembly
//! - `adapters/` - bitcoind JSON-RPC client, registry storage backends
//! - `service/` - `NodeService` capability set and the naming service
//! - `routes/` - HTTP routes
//! - `wiring/` - Chain follower

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod routes;
pub mod service;
pub mod wiring;

pub use container::{load_config, ConfigError, NodeConfig, NodeContainer};
pub use service::{NamingService, NodeService, ServiceError};
pub use wiring::ChainFollower;
