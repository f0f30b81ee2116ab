//! HTTP verification endpoint for otpgate.
//!
//! `GET /wsapi/2.0/verify?otp=..&nonce=..&id=..` validates a token for the
//! client `id` and answers with a signed plain-text verdict.

pub mod config;
pub mod reply;
pub mod verify;

use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use otpgate_core::Status;
use otpgate_store::{ClientRegistry, KeyRegistry, StoreError};
use serde::Deserialize;
use tracing::{error, warn};

pub use config::{ServerConfig, TokenField};
pub use reply::Reply;
pub use verify::verify_otp;

/// Path of the verification endpoint.
pub const VERIFY_PATH: &str = "/wsapi/2.0/verify";

/// Shared state for request handlers.
pub struct AppState {
    pub devices: Arc<dyn KeyRegistry>,
    pub clients: Arc<dyn ClientRegistry>,
    pub config: ServerConfig,
}

/// Query parameters of a verification request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyParams {
    pub otp: Option<String>,
    pub nonce: Option<String>,
    pub id: Option<String>,
}

impl VerifyParams {
    /// Collects parameters from raw query pairs. A repeated name keeps its
    /// first value; unknown names are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut params = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "otp" => &mut params.otp,
                "nonce" => &mut params.nonce,
                "id" => &mut params.id,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        params
    }
}

/// Handles one request end to end.
///
/// Parameters are checked first, then the client, and only then the token,
/// so a request from an unknown client never consumes a token.
pub fn handle_verify(state: &AppState, params: VerifyParams, now: DateTime<Utc>) -> Reply {
    let field = state.config.token_field;
    let (Some(otp), Some(nonce), Some(id)) = (params.otp.clone(), params.nonce.clone(), params.id)
    else {
        return Reply::new(
            field,
            params.nonce.unwrap_or_default(),
            params.otp.unwrap_or_default(),
            Status::MissingParameter,
            now,
        );
    };

    let key = match state.clients.mac_key(&id) {
        Ok(key) => key,
        Err(StoreError::NotFound(_)) => {
            warn!("Request from unknown client {:?}", id);
            return Reply::new(field, nonce, otp, Status::NoSuchClient, now);
        }
        Err(e) => {
            error!("Client lookup failed for {:?}: {}", id, e);
            return Reply::new(field, nonce, otp, Status::BackendError, now);
        }
    };

    let status = verify_otp(state.devices.as_ref(), &otp);
    Reply::new(field, nonce, otp, status, now).signed(&key)
}

async fn verify_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    let params = VerifyParams::from_pairs(pairs);
    let result = tokio::task::spawn_blocking(move || handle_verify(&state, params, Utc::now())).await;
    match result {
        Ok(reply) => reply.render().into_response(),
        Err(e) => {
            error!("Verification task panicked: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Build the HTTP router with the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(VERIFY_PATH, get(verify_handler))
        .with_state(state)
}
