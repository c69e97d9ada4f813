//! # Shared Types Crate
//!
//! Registry primitives used by every subsystem: the fixed-width [`Name`] and
//! [`ContentHash`] values and the validation errors produced when parsing them
//! from hex.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
