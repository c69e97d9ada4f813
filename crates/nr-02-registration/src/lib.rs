//! # Registration (nr-02)
//!
//! Builds and submits transactions that register a name.
//!
//! ## Flow
//!
//! ```text
//! register(name, hash)
//!   ├─ validate hex input            → InvalidInput
//!   ├─ registry lookup               → AlreadyRegistered
//!   ├─ first-fit identity UTXO ≥ fee → InsufficientFunds
//!   ├─ build + sign (P2PKH, ALL)     → SigningError
//!   ├─ strict validation             → SerializationError
//!   └─ broadcast                     → BroadcastError
//! ```
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Identity, UTXO selection, transaction assembly
//! - `ports/` - `RegistrationApi` (inbound); UTXO index, broadcaster,
//!   registry and identity store (outbound)
//! - `adapters/` - Outbound ports over the nr-01 `RegistryHandle`
//! - `service.rs` - `RegistrationService`

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use domain::errors::RegistrationError;
pub use domain::identity::Identity;
pub use domain::transaction::{build_registration, SignedRegistration, DUST_LIMIT, FIXED_FEE};
pub use domain::utxo::{select_utxo, SpendableOutput};
pub use ports::inbound::RegistrationApi;
pub use ports::outbound::{IdentityStore, NameRegistry, TransactionBroadcaster, UtxoIndex};
pub use service::{load_or_create_identity, RegistrationService};
