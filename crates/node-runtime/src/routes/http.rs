//! # Naming Service Routes
//!
//! | Method | Path                         | Success        | Failure                    |
//! |--------|------------------------------|----------------|----------------------------|
//! | GET    | `/name/:name`                | 200 hex hash   | 400 invalid name, 404      |
//! | PUT    | `/name/:name`                | 200 txid       | 400 rejection, 500         |
//! | GET    | `/address`                   | 200 address    |                            |
//!
//! Paths are relative to the service prefix. Internal failures are reported
//! as a generic `internal error`; the cause is logged. A register request is
//! checked name first, then body, so a bad name wins over a bad body.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use nr_02_registration::{RegistrationApi, RegistrationError};
use serde::Deserialize;
use shared_types::{InputError, Name};
use std::sync::Arc;
use tracing::error;

/// Body of a register request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "contentHash", alias = "blueprintHash")]
    pub content_hash: String,
}

impl RegisterRequest {
    /// Decode a register body. Anything without a string hash field is an
    /// invalid content hash.
    pub fn parse(body: &[u8]) -> Result<Self, InputError> {
        serde_json::from_slice(body).map_err(|_| InputError::InvalidContentHash { length: 0 })
    }
}

type ApiState = Arc<dyn RegistrationApi>;

/// Status and body reported for a failed request.
pub fn error_status(error: &RegistrationError) -> (StatusCode, &'static str) {
    match error {
        RegistrationError::InvalidInput(InputError::InvalidName { .. }) => {
            (StatusCode::BAD_REQUEST, "invalid name")
        }
        RegistrationError::InvalidInput(InputError::InvalidContentHash { .. }) => {
            (StatusCode::BAD_REQUEST, "invalid contentHash")
        }
        RegistrationError::AlreadyRegistered => (StatusCode::BAD_REQUEST, "name already registered"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
    }
}

fn failure(error: RegistrationError) -> Response {
    let (status, body) = error_status(&error);
    if status.is_server_error() {
        error!(error = %error, "Naming request failed");
    }
    (status, body).into_response()
}

/// Routes served under the service prefix.
pub fn router(api: ApiState) -> Router {
    Router::new()
        .route("/name/:name", get(lookup_name).put(register_name))
        .route("/address", get(funding_address))
        .with_state(api)
}

async fn lookup_name(State(api): State<ApiState>, Path(name): Path<String>) -> Response {
    match api.lookup(&name).await {
        Ok(Some(content_hash)) => (StatusCode::OK, content_hash.to_hex()).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "not found").into_response(),
        Err(e) => failure(e),
    }
}

async fn register_name(
    State(api): State<ApiState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Response {
    if let Err(e) = Name::from_hex(&name) {
        return failure(e.into());
    }
    let request = match RegisterRequest::parse(&body) {
        Ok(request) => request,
        Err(e) => return failure(e.into()),
    };
    match api.register(&name, &request.content_hash).await {
        Ok(txid) => (StatusCode::OK, txid.to_string()).into_response(),
        Err(e) => failure(e),
    }
}

async fn funding_address(State(api): State<ApiState>) -> String {
    api.funding_address().to_string()
}
