//! Adapters: storage backends and the typed registry record layer.

pub mod registry_store;
pub mod storage;

pub use registry_store::RegistryStore;
