//! # Registry Writer Queue
//!
//! All registry mutations, from block events and from unconfirmed
//! transactions alike, go through one writer that owns the store. Callers
//! hold a cloneable [`RegistryHandle`] and await replies, so the store never
//! sees interleaved work from two sources.

mod actor;
mod handle;

pub use actor::{spawn_registry_writer, RegistryCommand, RegistryWriter};
pub use handle::RegistryHandle;

/// Default command queue depth.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
