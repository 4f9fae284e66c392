//! Identity lookups used when minting credentials.

use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use crate::token::RoleAssignment;

/// A user's company and role assignments as stored in the directory tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub roles: Vec<RoleAssignment>,
}

/// Load the identity for `user_id`, or `None` when the user does not exist.
///
/// # Errors
/// Returns an error if a query fails.
#[instrument(skip(pool))]
pub async fn load_identity(pool: &PgPool, user_id: Uuid) -> Result<Option<Identity>, sqlx::Error> {
    let Some(user) = sqlx::query("SELECT company_id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
    else {
        return Ok(None);
    };
    let company_id: Uuid = user.try_get("company_id")?;

    let rows = sqlx::query(
        r"
        SELECT r.id, r.name, r.company_id
        FROM user_roles ur
        JOIN roles r ON r.id = ur.role_id
        WHERE ur.user_id = $1
        ORDER BY r.name, r.id
        ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let roles = rows
        .iter()
        .map(|row| {
            Ok(RoleAssignment {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                company_id: row.try_get("company_id")?,
            })
        })
        .collect::<Result<Vec<_>, sqlx::Error>>()?;

    Ok(Some(Identity {
        user_id,
        company_id,
        roles,
    }))
}
