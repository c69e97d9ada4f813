//! # Wiring
//!
//! Connects the ledger node to the node services.
//!
//! ```text
//! bitcoind ──ChainSource──→ ChainFollower ──block_handler / transaction_handler──→ NamingService
//!                                                                                     │
//!                                                                       RegistryHandle (single writer)
//! ```

pub mod chain_follower;

pub use chain_follower::{ChainFollower, FollowerError, PollReport};
