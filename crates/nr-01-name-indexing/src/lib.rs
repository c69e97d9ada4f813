//! # Name Indexing (nr-01)
//!
//! Maintains the name -> content-hash registry from ledger events.
//!
//! ```text
//! block connected ──┐
//! block disconnected├──→ RegistryHandle ──→ RegistryWriter ──→ NameIndexingService ──→ KeyValueStore
//! unconfirmed tx ───┘        (clone)          (single owner)
//! ```
//!
//! ## Registry Rules
//!
//! | Rule | Description |
//! |------|-------------|
//! | Frame shape | `OP_RETURN` push of exactly `"byrd" ‖ hash(32) ‖ name(44)` |
//! | First writer wins | A name with an entry is never overwritten |
//! | In-block dedup | Only the first frame for a name in a block counts |
//! | Atomic blocks | One batch per block event; a store failure commits nothing |
//! | Single writer | Block and unconfirmed paths share one mutation queue |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Frame codec, mutation model, pure indexing rules
//! - `ports/` - `NameIndexingApi` (inbound), `KeyValueStore` (outbound)
//! - `adapters/` - Storage backends and the typed `RegistryStore`
//! - `service.rs` - `NameIndexingService`
//! - `queue/` - `RegistryWriter` actor and `RegistryHandle`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod queue;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::storage::{FileBackedKVStore, InMemoryKVStore};
pub use adapters::RegistryStore;
pub use domain::entities::{ChainTip, IndexerConfig, DEFAULT_JOURNAL_DEPTH};
pub use domain::errors::{IndexingError, KVStoreError};
pub use domain::frame::{decode_output, decode_payload, Frame, FRAME_LEN, MAGIC};
pub use domain::mutation::{MutationBatch, MutationKind, MutationOp};
pub use ports::inbound::NameIndexingApi;
pub use ports::outbound::{BatchOperation, KeyValueStore};
pub use queue::{spawn_registry_writer, RegistryHandle, DEFAULT_QUEUE_CAPACITY};
pub use service::NameIndexingService;
