//! Session credential codec.
//!
//! Credentials are compact HS256 JWTs (`header.claims.signature`) carrying the
//! acting user, their company and their role assignments. They are stateless:
//! a valid signature plus an unexpired `exp` is all the server checks, nothing
//! is stored and nothing can be revoked early. Rotating the secret invalidates
//! every outstanding credential.

mod error;
mod jwt;

pub use error::Error;
pub use jwt::{sign_hs256, verify_hs256, Claims, TokenHeader, ALGORITHM};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::{Duration, SystemTime};
use utoipa::ToSchema;
use uuid::Uuid;

/// A role held by a user inside one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoleAssignment {
    pub id: Uuid,
    pub name: String,
    pub company_id: Uuid,
}

/// Issue a credential for `user_id` in `company_id`, valid for `ttl`.
///
/// # Errors
/// Returns an error if the TTL does not fit in unix seconds or the claims cannot be encoded.
pub fn issue(
    user_id: Uuid,
    company_id: Uuid,
    roles: &[RoleAssignment],
    ttl: Duration,
    secret: &[u8],
) -> Result<String, Error> {
    issue_at(user_id, company_id, roles, ttl, secret, now_unix_seconds())
}

/// Same as [`issue`] with an explicit issue time.
///
/// # Errors
/// Returns an error if the TTL does not fit in unix seconds or the claims cannot be encoded.
pub fn issue_at(
    user_id: Uuid,
    company_id: Uuid,
    roles: &[RoleAssignment],
    ttl: Duration,
    secret: &[u8],
    now_unix_seconds: i64,
) -> Result<String, Error> {
    let ttl_seconds = i64::try_from(ttl.as_secs()).map_err(|_| Error::InvalidTtl)?;
    let exp = now_unix_seconds
        .checked_add(ttl_seconds)
        .ok_or(Error::InvalidTtl)?;
    let claims = Claims::new(user_id, company_id, roles, now_unix_seconds, exp);
    sign_hs256(secret, &claims)
}

/// Decode and verify a credential against the current time.
///
/// # Errors
/// See [`verify_hs256`].
pub fn decode(token: &str, secret: &[u8]) -> Result<Claims, Error> {
    verify_hs256(token, secret, now_unix_seconds())
}

/// Issues and verifies credentials with the process-wide secret and TTL.
///
/// Built once at startup from configuration and shared read-only between
/// requests.
#[derive(Clone)]
pub struct TokenCodec {
    secret: SecretString,
    ttl: Duration,
}

impl TokenCodec {
    /// # Errors
    /// Returns [`Error::InvalidKey`] for an empty secret.
    pub fn new(secret: SecretString, ttl: Duration) -> Result<Self, Error> {
        if secret.expose_secret().is_empty() {
            return Err(Error::InvalidKey);
        }
        Ok(Self { secret, ttl })
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// # Errors
    /// See [`issue`].
    pub fn issue(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        roles: &[RoleAssignment],
    ) -> Result<String, Error> {
        self.issue_with_ttl(user_id, company_id, roles, self.ttl)
    }

    /// Issue with a TTL other than the configured one.
    ///
    /// # Errors
    /// See [`issue`].
    pub fn issue_with_ttl(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        roles: &[RoleAssignment],
        ttl: Duration,
    ) -> Result<String, Error> {
        issue(
            user_id,
            company_id,
            roles,
            ttl,
            self.secret.expose_secret().as_bytes(),
        )
    }

    /// # Errors
    /// See [`issue_at`].
    pub fn issue_at(
        &self,
        user_id: Uuid,
        company_id: Uuid,
        roles: &[RoleAssignment],
        now_unix_seconds: i64,
    ) -> Result<String, Error> {
        issue_at(
            user_id,
            company_id,
            roles,
            self.ttl,
            self.secret.expose_secret().as_bytes(),
            now_unix_seconds,
        )
    }

    /// # Errors
    /// See [`verify_hs256`].
    pub fn decode(&self, token: &str) -> Result<Claims, Error> {
        self.decode_at(token, now_unix_seconds())
    }

    /// # Errors
    /// See [`verify_hs256`].
    pub fn decode_at(&self, token: &str, now_unix_seconds: i64) -> Result<Claims, Error> {
        verify_hs256(
            token,
            self.secret.expose_secret().as_bytes(),
            now_unix_seconds,
        )
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"***")
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Unix seconds for token TTL validation.
#[must_use]
pub fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
