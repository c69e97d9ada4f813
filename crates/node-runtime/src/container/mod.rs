//! # Node Container
//!
//! Configuration and the assembled set of running components.

pub mod config;
pub mod node;

pub use config::{load_config, ConfigError, NodeConfig};
pub use node::NodeContainer;
