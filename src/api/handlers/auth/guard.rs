//! Request gate for authenticated routes.
//!
//! A request is either admitted, with its verified [`Claims`] attached to the
//! request extensions, or rejected with `401` before any handler runs. Missing
//! headers, malformed tokens, bad signatures, foreign algorithms and expired
//! tokens are all rejected the same way.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use super::session::{decode_credential, SessionError};
use crate::api::handlers::envelope::{reject, ResponseKey};
use crate::token::TokenCodec;

pub async fn require_credential(
    State(codec): State<Arc<TokenCodec>>,
    mut request: Request,
    next: Next,
) -> Response {
    match decode_credential(request.headers(), &codec) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(err) => {
            let reason = match &err {
                SessionError::Credential(token_err) => token_err.kind(),
                SessionError::MissingCredential => "missing",
                SessionError::InvalidClaim(_) | SessionError::Misconfigured => "invalid",
            };
            debug!(reason, path = %request.uri().path(), "credential rejected");
            reject(ResponseKey::Unauthorized)
        }
    }
}
