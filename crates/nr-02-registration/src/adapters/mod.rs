//! Adapters binding registration ports to the name indexing subsystem.

mod registry;
