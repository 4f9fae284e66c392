//! Session extraction from bearer credentials.
//!
//! Flow Overview: read `Authorization: Bearer <token>`, decode it with the
//! shared [`TokenCodec`], then rebuild a typed [`Session`] from the claims.
//! Reconstruction is all-or-nothing: one bad role record rejects the whole
//! credential instead of yielding a partial session.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::handlers::envelope::{reject, respond, ResponseKey};
use crate::token::{self, Claims, RoleAssignment, TokenCodec};

/// Authenticated caller reconstructed from a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Session {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub roles: Vec<RoleAssignment>,
}

impl Session {
    /// Extract a session straight from request headers.
    ///
    /// # Errors
    /// Returns [`SessionError::MissingCredential`] without a usable bearer header,
    /// [`SessionError::Credential`] when decode fails and
    /// [`SessionError::InvalidClaim`] when the claims cannot be rebuilt.
    pub fn from_headers(headers: &HeaderMap, codec: &TokenCodec) -> Result<Self, SessionError> {
        let claims = decode_credential(headers, codec)?;
        Self::try_from(&claims)
    }

    /// Whether the session holds any role assigned within `company_id`.
    #[must_use]
    pub fn has_role_in(&self, company_id: Uuid) -> bool {
        self.roles.iter().any(|role| role.company_id == company_id)
    }
}

impl TryFrom<&Claims> for Session {
    type Error = SessionError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::parse_str(&claims.user_id)
            .map_err(|_| SessionError::InvalidClaim("user_id".to_string()))?;
        let company_id = Uuid::parse_str(&claims.company_id)
            .map_err(|_| SessionError::InvalidClaim("company_id".to_string()))?;
        let roles = claims
            .roles
            .iter()
            .enumerate()
            .map(|(index, value)| {
                role_from_value(value)
                    .map_err(|field| SessionError::InvalidClaim(format!("roles[{index}].{field}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            user_id,
            company_id,
            roles,
        })
    }
}

fn role_from_value(value: &Value) -> Result<RoleAssignment, &'static str> {
    let id = uuid_field(value, "id")?;
    let name = value
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or("name")?
        .to_string();
    let company_id = uuid_field(value, "company_id")?;
    Ok(RoleAssignment {
        id,
        name,
        company_id,
    })
}

fn uuid_field(value: &Value, field: &'static str) -> Result<Uuid, &'static str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or(field)
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("invalid credential: {0}")]
    Credential(#[from] token::Error),
    #[error("invalid claim: {0}")]
    InvalidClaim(String),
    #[error("token codec is not configured")]
    Misconfigured,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        match self {
            Self::Misconfigured => {
                error!("Session extractor used without a token codec");
                reject(ResponseKey::UnknownError)
            }
            other => {
                debug!(reason = %other, "session rejected");
                reject(ResponseKey::Unauthorized)
            }
        }
    }
}

/// Decode the bearer credential on `headers`.
///
/// This is the only decode path: the guard and the extractor both go through
/// it.
pub(crate) fn decode_credential(
    headers: &HeaderMap,
    codec: &TokenCodec,
) -> Result<Claims, SessionError> {
    let token = extract_bearer_token(headers).ok_or(SessionError::MissingCredential)?;
    Ok(codec.decode(token)?)
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, rest) = value.trim().split_once(|c: char| c.is_ascii_whitespace())?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Claims attached by the guard were already verified for this request.
        if let Some(claims) = parts.extensions.get::<Claims>() {
            return Self::try_from(claims);
        }
        let codec = parts
            .extensions
            .get::<Arc<TokenCodec>>()
            .ok_or(SessionError::Misconfigured)?;
        Self::from_headers(&parts.headers, codec)
    }
}

#[utoipa::path(
    get,
    path = "/v1/session",
    responses(
        (status = 200, description = "Session carried by the bearer credential.", body = Session),
        (status = 401, description = "Missing, invalid or expired credential."),
    ),
    security(("bearer" = [])),
    tag = "session"
)]
/// Returns the session reconstructed from the caller's credential.
pub async fn current_session(session: Session) -> Response {
    respond(ResponseKey::Success, session)
}
