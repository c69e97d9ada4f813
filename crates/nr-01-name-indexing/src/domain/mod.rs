//! Domain layer: frame codec, mutation model and block indexing rules.

pub mod entities;
pub mod errors;
pub mod frame;
pub mod indexer;
pub mod keys;
pub mod mutation;
