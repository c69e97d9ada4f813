//! # HTTP Routes
//!
//! Transport for the registry's lookup and register operations.

pub mod http;

pub use http::{error_status, router, RegisterRequest};

use crate::service::NodeService;
use axum::Router;
use std::sync::Arc;

/// Nest each service's routes under `/<prefix>`.
pub fn mount(services: &[Arc<dyn NodeService>]) -> Router {
    services.iter().fold(Router::new(), |app, service| {
        app.nest(&format!("/{}", service.prefix()), service.routes())
    })
}
