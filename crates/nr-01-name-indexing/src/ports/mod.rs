//! Ports (hexagonal architecture boundaries).

pub mod inbound;
pub mod outbound;
