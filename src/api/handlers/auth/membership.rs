//! Company membership checks.
//!
//! Every handler that reads or mutates company- or user-scoped data calls one
//! of these first. The identity comparisons run before the database lookup,
//! so a session pointed at another tenant is denied without a query.

use sqlx::{PgPool, Row};
use thiserror::Error;
use tracing::{debug, instrument};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("membership denied")]
    Denied,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Pure part of [`check_belonging`]: the target company must be the session's.
///
/// # Errors
/// Returns [`MembershipError::Denied`] on mismatch.
pub fn ensure_same_company(company_id: Uuid, session_company_id: Uuid) -> Result<(), MembershipError> {
    if company_id == session_company_id {
        Ok(())
    } else {
        Err(MembershipError::Denied)
    }
}

/// Pure part of [`check_session`]: a user may only act as themselves.
///
/// # Errors
/// Returns [`MembershipError::Denied`] on mismatch.
pub fn ensure_same_user(target_user_id: Uuid, session_user_id: Uuid) -> Result<(), MembershipError> {
    if target_user_id == session_user_id {
        Ok(())
    } else {
        Err(MembershipError::Denied)
    }
}

/// Confirms `acting_user_id` may operate on `company_id` under a session
/// issued for `session_company_id`.
///
/// # Errors
/// Returns [`MembershipError::Denied`] when the company differs from the
/// session's or the user is not employed there.
#[instrument(skip(pool))]
pub async fn check_belonging(
    pool: &PgPool,
    company_id: Uuid,
    acting_user_id: Uuid,
    session_company_id: Uuid,
) -> Result<(), MembershipError> {
    ensure_same_company(company_id, session_company_id)?;
    if user_in_company(pool, acting_user_id, company_id).await? {
        Ok(())
    } else {
        debug!("acting user is not a member of the company");
        Err(MembershipError::Denied)
    }
}

/// Confirms the session user is `target_user_id` and still belongs to the
/// session's company.
///
/// # Errors
/// Returns [`MembershipError::Denied`] when the users differ or the user left
/// the company.
#[instrument(skip(pool))]
pub async fn check_session(
    pool: &PgPool,
    target_user_id: Uuid,
    session_user_id: Uuid,
    session_company_id: Uuid,
) -> Result<(), MembershipError> {
    ensure_same_user(target_user_id, session_user_id)?;
    if user_in_company(pool, target_user_id, session_company_id).await? {
        Ok(())
    } else {
        debug!("session user is not a member of the session company");
        Err(MembershipError::Denied)
    }
}

async fn user_in_company(pool: &PgPool, user_id: Uuid, company_id: Uuid) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        r"
        SELECT EXISTS (
            SELECT 1 FROM users WHERE id = $1 AND company_id = $2
        ) AS member
        ",
    )
    .bind(user_id)
    .bind(company_id)
    .fetch_one(pool)
    .await?;
    row.try_get("member")
}
