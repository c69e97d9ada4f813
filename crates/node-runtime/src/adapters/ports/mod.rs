//! # Runtime Ports
//!
//! Traits the runtime wiring depends on, implemented by the adapters.

pub mod chain_source;

pub use chain_source::{ChainSource, LedgerError};
