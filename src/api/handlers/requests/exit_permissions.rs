//! Exit-permission request endpoints.
//!
//! An exit permission covers a window inside one working day, so `from_time`
//! must be strictly earlier than `to_time`.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::info;

use super::{
    flow::{self, reply},
    storage::{insert_sql, response_from_row, RequestError, RequestKind},
    types::{
        CreateExitPermissionRequest, ExitPermissionResponse, ListQuery, RequestRecord,
        ReviewRequest,
    },
    validate,
};
use crate::api::handlers::auth::Session;
use crate::api::handlers::envelope::ResponseKey;
use crate::api::handlers::pagination::PaginationConfig;

pub(super) struct ExitPermissions;

impl RequestKind for ExitPermissions {
    const TABLE: &'static str = "exit_permissions";
    const DETAIL_COLUMNS: &'static str = r"to_char(exit_date, 'YYYY-MM-DD') AS date,
        to_char(from_time, 'HH24:MI') AS from_time,
        to_char(to_time, 'HH24:MI') AS to_time";
    type Response = ExitPermissionResponse;

    fn from_row(record: RequestRecord, row: &PgRow) -> Result<Self::Response, sqlx::Error> {
        Ok(ExitPermissionResponse {
            record,
            date: row.try_get("date")?,
            from_time: row.try_get("from_time")?,
            to_time: row.try_get("to_time")?,
        })
    }

    fn record(response: &Self::Response) -> &RequestRecord {
        &response.record
    }
}

pub(super) fn routes() -> Router {
    Router::new()
        .route("/v1/exit-permissions", post(create_exit_permission))
        .route(
            "/v1/exit-permissions/:id",
            get(get_exit_permission).delete(delete_exit_permission),
        )
        .route("/v1/exit-permissions/:id/status", patch(review_exit_permission))
        .route(
            "/v1/companies/:company_id/exit-permissions",
            get(list_company_exit_permissions),
        )
        .route(
            "/v1/users/:user_id/exit-permissions",
            get(list_user_exit_permissions),
        )
}

#[utoipa::path(
    post,
    path = "/v1/exit-permissions",
    request_body = CreateExitPermissionRequest,
    responses(
        (status = 201, description = "Request filed.", body = ExitPermissionResponse),
        (status = 400, description = "Invalid input or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "exit-permissions"
)]
/// Files a pending exit-permission request for the session user.
pub async fn create_exit_permission(
    session: Session,
    pool: Extension<PgPool>,
    payload: Result<Json<CreateExitPermissionRequest>, JsonRejection>,
) -> Response {
    reply(ResponseKey::Created, create(&pool, &session, payload).await)
}

async fn create(
    pool: &PgPool,
    session: &Session,
    payload: Result<Json<CreateExitPermissionRequest>, JsonRejection>,
) -> Result<ExitPermissionResponse, RequestError> {
    let payload = validate::body(payload)?;
    let date = validate::date(&payload.date)?;
    let from_time = validate::time(&payload.from_time)?;
    let to_time = validate::time(&payload.to_time)?;
    if from_time >= to_time {
        return Err(RequestError::Invalid("from_time must be before to_time"));
    }
    let reason = validate::reason(&payload.reason)?;
    flow::ensure_can_file(pool, session).await?;

    let sql = insert_sql::<ExitPermissions>(
        "exit_date, from_time, to_time",
        "$4::date, $5::time, $6::time",
    );
    let row = sqlx::query(&sql)
        .bind(session.user_id)
        .bind(session.company_id)
        .bind(reason)
        .bind(date.to_sql())
        .bind(from_time.to_sql())
        .bind(to_time.to_sql())
        .fetch_one(pool)
        .await?;
    let response = response_from_row::<ExitPermissions>(&row)?;
    info!(request_id = %response.record.id, user_id = %session.user_id, "exit permission requested");
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/v1/exit-permissions/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request.", body = ExitPermissionResponse),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "exit-permissions"
)]
/// Returns one request to its owner or to a role holder in its company.
pub async fn get_exit_permission(
    session: Session,
    pool: Extension<PgPool>,
    Path(id): Path<String>,
) -> Response {
    reply(
        ResponseKey::Success,
        flow::get::<ExitPermissions>(&pool, &session, &id).await,
    )
}

#[utoipa::path(
    get,
    path = "/v1/companies/{company_id}/exit-permissions",
    params(
        ("company_id" = String, Path, description = "Company id"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Page of the company's exit-permission requests.", body = [ExitPermissionResponse]),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "exit-permissions"
)]
/// Lists a company's exit-permission requests, newest first.
pub async fn list_company_exit_permissions(
    session: Session,
    pool: Extension<PgPool>,
    Extension(pagination): Extension<PaginationConfig>,
    Path(company_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let query = validate::query(query);
    reply(
        ResponseKey::Success,
        flow::list_for_company::<ExitPermissions>(&pool, &session, pagination, &company_id, &query)
            .await,
    )
}

#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/exit-permissions",
    params(
        ("user_id" = String, Path, description = "User id"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Page of the user's exit-permission requests.", body = [ExitPermissionResponse]),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "exit-permissions"
)]
/// Lists the session user's own exit-permission requests.
pub async fn list_user_exit_permissions(
    session: Session,
    pool: Extension<PgPool>,
    Extension(pagination): Extension<PaginationConfig>,
    Path(user_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let query = validate::query(query);
    reply(
        ResponseKey::Success,
        flow::list_for_user::<ExitPermissions>(&pool, &session, pagination, &user_id, &query).await,
    )
}

#[utoipa::path(
    patch,
    path = "/v1/exit-permissions/{id}/status",
    request_body = ReviewRequest,
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request reviewed.", body = ExitPermissionResponse),
        (status = 400, description = "Invalid status, already reviewed or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "exit-permissions"
)]
/// Approves or rejects a pending exit-permission request.
pub async fn review_exit_permission(
    session: Session,
    pool: Extension<PgPool>,
    Path(id): Path<String>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Response {
    let review = match validate::body(payload) {
        Ok(review) => review,
        Err(err) => return err.into_response(),
    };
    reply(
        ResponseKey::Success,
        flow::review::<ExitPermissions>(&pool, &session, &id, review.status).await,
    )
}

#[utoipa::path(
    delete,
    path = "/v1/exit-permissions/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request deleted."),
        (status = 400, description = "Not pending, not the owner or invalid id."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "exit-permissions"
)]
/// Withdraws the session user's pending exit-permission request.
pub async fn delete_exit_permission(
    session: Session,
    pool: Extension<PgPool>,
    Path(id): Path<String>,
) -> Response {
    reply(
        ResponseKey::Success,
        flow::withdraw::<ExitPermissions>(&pool, &session, &id).await,
    )
}
