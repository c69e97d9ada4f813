//! Domain layer: identity, funding selection and transaction assembly.

pub mod errors;
pub mod identity;
pub mod transaction;
pub mod utxo;
