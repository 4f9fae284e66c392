//! Shared SQL storage helpers for employee requests.
//!
//! All four request tables carry the same bookkeeping columns, so reads,
//! reviews and deletes are written once against [`RequestKind`]. Inserts stay
//! with each kind because their columns and casts differ.

use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::{postgres::PgRow, PgPool, Row};
use thiserror::Error;
use tracing::{debug, error, instrument};
use uuid::Uuid;

use super::types::{RequestRecord, RequestStatus};
use crate::api::handlers::auth::MembershipError;
use crate::api::handlers::envelope::{reject, ResponseKey};
use crate::api::handlers::pagination::Page;

const RECORD_COLUMNS: &str = r#"id, user_id, company_id, status, reason,
    to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
    reviewed_by,
    to_char(reviewed_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS reviewed_at"#;

/// One request table and the shape of its rows.
pub(super) trait RequestKind {
    /// Table name, also used in log fields.
    const TABLE: &'static str;
    /// Select list for the kind-specific columns, rendered as text where needed.
    const DETAIL_COLUMNS: &'static str;

    type Response: Serialize + Send + Sync + 'static;

    fn from_row(record: RequestRecord, row: &PgRow) -> Result<Self::Response, sqlx::Error>;

    fn record(response: &Self::Response) -> &RequestRecord;
}

#[derive(Debug, Error)]
pub(super) enum RequestError {
    #[error("invalid request: {0}")]
    Invalid(&'static str),
    #[error("request not found")]
    NotFound,
    #[error("membership denied")]
    Denied,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<MembershipError> for RequestError {
    fn from(err: MembershipError) -> Self {
        match err {
            MembershipError::Denied => Self::Denied,
            MembershipError::Database(err) => Self::Database(err),
        }
    }
}

impl IntoResponse for RequestError {
    /// Database errors are logged server-side and surface as `UNKNOWN_ERROR`
    /// without details. A membership denial answers like any invalid request.
    fn into_response(self) -> Response {
        match self {
            Self::Invalid(message) => {
                debug!(message, "invalid request");
                reject(ResponseKey::InvalidRequest)
            }
            Self::Denied => {
                debug!("membership denied");
                reject(ResponseKey::InvalidRequest)
            }
            Self::NotFound => reject(ResponseKey::DataNotFound),
            Self::Database(err) => {
                error!("Database error: {err}");
                reject(ResponseKey::UnknownError)
            }
        }
    }
}

/// Which owner column a list query filters on.
#[derive(Debug, Clone, Copy)]
pub(super) enum ListScope {
    Company(Uuid),
    User(Uuid),
}

impl ListScope {
    fn column(self) -> &'static str {
        match self {
            Self::Company(_) => "company_id",
            Self::User(_) => "user_id",
        }
    }

    fn id(self) -> Uuid {
        match self {
            Self::Company(id) | Self::User(id) => id,
        }
    }
}

fn select_sql<K: RequestKind>(filter: &str) -> String {
    format!(
        "SELECT {RECORD_COLUMNS}, {} FROM {} {filter}",
        K::DETAIL_COLUMNS,
        K::TABLE
    )
}

/// Builds `INSERT ... RETURNING` for a kind. `$1..$3` are always
/// `user_id, company_id, reason`; the kind's own placeholders start at `$4`.
pub(super) fn insert_sql<K: RequestKind>(columns: &str, values: &str) -> String {
    format!(
        "INSERT INTO {} (user_id, company_id, reason, {columns}) \
         VALUES ($1, $2, $3, {values}) \
         RETURNING {RECORD_COLUMNS}, {}",
        K::TABLE,
        K::DETAIL_COLUMNS
    )
}

pub(super) fn record_from_row(row: &PgRow) -> Result<RequestRecord, sqlx::Error> {
    let status: String = row.try_get("status")?;
    let status = RequestStatus::parse(&status).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: "status".to_string(),
        source: format!("unknown request status: {status}").into(),
    })?;
    Ok(RequestRecord {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        company_id: row.try_get("company_id")?,
        status,
        reason: row.try_get("reason")?,
        created_at: row.try_get("created_at")?,
        reviewed_by: row.try_get("reviewed_by")?,
        reviewed_at: row.try_get("reviewed_at")?,
    })
}

pub(super) fn response_from_row<K: RequestKind>(row: &PgRow) -> Result<K::Response, sqlx::Error> {
    let record = record_from_row(row)?;
    K::from_row(record, row)
}

#[instrument(skip(pool), fields(table = K::TABLE))]
pub(super) async fn fetch_request<K: RequestKind>(
    pool: &PgPool,
    id: Uuid,
) -> Result<Option<K::Response>, sqlx::Error> {
    let sql = select_sql::<K>("WHERE id = $1");
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;
    row.as_ref().map(response_from_row::<K>).transpose()
}

/// Returns one page of requests in `scope`, newest first, plus the total
/// number of matching rows.
#[instrument(skip(pool), fields(table = K::TABLE))]
pub(super) async fn list_requests<K: RequestKind>(
    pool: &PgPool,
    scope: ListScope,
    status: Option<RequestStatus>,
    page: Page,
) -> Result<(Vec<K::Response>, i64), sqlx::Error> {
    let filter = format!(
        "WHERE {} = $1 AND ($2::text IS NULL OR status = $2)",
        scope.column()
    );
    let status = status.map(RequestStatus::as_str);

    let count_sql = format!("SELECT COUNT(*) AS total FROM {} {filter}", K::TABLE);
    let total: i64 = sqlx::query(&count_sql)
        .bind(scope.id())
        .bind(status)
        .fetch_one(pool)
        .await?
        .try_get("total")?;

    let list_sql = select_sql::<K>(&format!(
        "{filter} ORDER BY created_at DESC, id LIMIT $3 OFFSET $4"
    ));
    let rows = sqlx::query(&list_sql)
        .bind(scope.id())
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(pool)
        .await?;
    let items = rows
        .iter()
        .map(response_from_row::<K>)
        .collect::<Result<Vec<_>, _>>()?;
    Ok((items, total))
}

/// Moves a pending request to `status`. Returns `None` when the row is gone
/// or was reviewed concurrently.
#[instrument(skip(pool), fields(table = K::TABLE))]
pub(super) async fn update_status<K: RequestKind>(
    pool: &PgPool,
    id: Uuid,
    status: RequestStatus,
    reviewer: Uuid,
) -> Result<Option<K::Response>, sqlx::Error> {
    let sql = format!(
        "UPDATE {} SET status = $2, reviewed_by = $3, reviewed_at = NOW() \
         WHERE id = $1 AND status = 'pending' \
         RETURNING {RECORD_COLUMNS}, {}",
        K::TABLE,
        K::DETAIL_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(id)
        .bind(status.as_str())
        .bind(reviewer)
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(response_from_row::<K>).transpose()
}

/// Deletes a request only while it is still pending.
#[instrument(skip(pool), fields(table = K::TABLE))]
pub(super) async fn delete_pending<K: RequestKind>(
    pool: &PgPool,
    id: Uuid,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "DELETE FROM {} WHERE id = $1 AND status = 'pending'",
        K::TABLE
    );
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::requests::types::AdvanceSalaryResponse;
    use axum::http::StatusCode;

    struct Bonus;

    impl RequestKind for Bonus {
        const TABLE: &'static str = "bonuses";
        const DETAIL_COLUMNS: &'static str = "amount";
        type Response = AdvanceSalaryResponse;

        fn from_row(record: RequestRecord, row: &PgRow) -> Result<Self::Response, sqlx::Error> {
            Ok(AdvanceSalaryResponse {
                record,
                amount: row.try_get("amount")?,
            })
        }

        fn record(response: &Self::Response) -> &RequestRecord {
            &response.record
        }
    }

    #[test]
    fn select_sql_targets_kind_table() {
        let sql = select_sql::<Bonus>("WHERE id = $1");
        assert!(sql.starts_with("SELECT id, user_id, company_id, status, reason,"));
        assert!(sql.ends_with(", amount FROM bonuses WHERE id = $1"));
    }

    #[test]
    fn insert_sql_reserves_shared_placeholders() {
        let sql = insert_sql::<Bonus>("amount", "$4");
        assert!(sql.starts_with(
            "INSERT INTO bonuses (user_id, company_id, reason, amount) VALUES ($1, $2, $3, $4)"
        ));
        assert!(sql.contains("RETURNING id, user_id"));
        assert!(sql.ends_with(", amount"));
    }

    #[test]
    fn list_scope_picks_owner_column() {
        let id = Uuid::new_v4();
        assert_eq!(ListScope::Company(id).column(), "company_id");
        assert_eq!(ListScope::User(id).column(), "user_id");
        assert_eq!(ListScope::User(id).id(), id);
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            RequestError::Invalid("bad").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::Denied.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            RequestError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            RequestError::Database(sqlx::Error::RowNotFound)
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn membership_errors_convert() {
        assert!(matches!(
            RequestError::from(MembershipError::Denied),
            RequestError::Denied
        ));
        assert!(matches!(
            RequestError::from(MembershipError::Database(sqlx::Error::PoolClosed)),
            RequestError::Database(_)
        ));
    }
}
