//! Leave request endpoints.

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
    types::{CreateLeaveRequest, LeaveResponse, ListQuery, RequestRecord, ReviewRequest},
    validate,
};
use crate::api::handlers::auth::Session;
use crate::api::handlers::envelope::ResponseKey;
use crate::api::handlers::pagination::PaginationConfig;

pub(super) struct Leaves;

impl RequestKind for Leaves {
    const TABLE: &'static str = "leaves";
    const DETAIL_COLUMNS: &'static str = r"leave_type,
        to_char(start_date, 'YYYY-MM-DD') AS start_date,
        to_char(end_date, 'YYYY-MM-DD') AS end_date";
    type Response = LeaveResponse;

    fn from_row(record: RequestRecord, row: &PgRow) -> Result<Self::Response, sqlx::Error> {
        Ok(LeaveResponse {
            record,
            leave_type: row.try_get("leave_type")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
        })
    }

    fn record(response: &Self::Response) -> &RequestRecord {
        &response.record
    }
}

pub(super) fn routes() -> Router {
    Router::new()
        .route("/v1/leaves", post(create_leave))
        .route("/v1/leaves/:id", get(get_leave).delete(delete_leave))
        .route("/v1/leaves/:id/status", patch(review_leave))
        .route("/v1/companies/:company_id/leaves", get(list_company_leaves))
        .route("/v1/users/:user_id/leaves", get(list_user_leaves))
}

#[utoipa::path(
    post,
    path = "/v1/leaves",
    request_body = CreateLeaveRequest,
    responses(
        (status = 201, description = "Request filed.", body = LeaveResponse),
        (status = 400, description = "Invalid input or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "leaves"
)]
/// Files a pending leave request for the session user.
pub async fn create_leave(
    session: Session,
    pool: Extension<PgPool>,
    payload: Result<Json<CreateLeaveRequest>, JsonRejection>,
) -> Response {
    reply(ResponseKey::Created, create(&pool, &session, payload).await)
}

async fn create(
    pool: &PgPool,
    session: &Session,
    payload: Result<Json<CreateLeaveRequest>, JsonRejection>,
) -> Result<LeaveResponse, RequestError> {
    let payload = validate::body(payload)?;
    let leave_type = payload.leave_type.trim();
    if leave_type.is_empty() {
        return Err(RequestError::Invalid("leave_type is required"));
    }
    let start_date = validate::date(&payload.start_date)?;
    let end_date = validate::date(&payload.end_date)?;
    if start_date > end_date {
        return Err(RequestError::Invalid("start_date must not be after end_date"));
    }
    let reason = validate::reason(&payload.reason)?;
    flow::ensure_can_file(pool, session).await?;

    let sql = insert_sql::<Leaves>("leave_type, start_date, end_date", "$4, $5::date, $6::date");
    let row = sqlx::query(&sql)
        .bind(session.user_id)
        .bind(session.company_id)
        .bind(reason)
        .bind(leave_type)
        .bind(start_date.to_sql())
        .bind(end_date.to_sql())
        .fetch_one(pool)
        .await?;
    let response = response_from_row::<Leaves>(&row)?;
    info!(request_id = %response.record.id, user_id = %session.user_id, "leave requested");
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/v1/leaves/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request.", body = LeaveResponse),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "leaves"
)]
/// Returns one request to its owner or to a role holder in its company.
pub async fn get_leave(
    session: Session,
    pool: Extension<PgPool>,
    Path(id): Path<String>,
) -> Response {
    reply(
        ResponseKey::Success,
        flow::get::<Leaves>(&pool, &session, &id).await,
    )
}

#[utoipa::path(
    get,
    path = "/v1/companies/{company_id}/leaves",
    params(
        ("company_id" = String, Path, description = "Company id"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Page of the company's leave requests.", body = [LeaveResponse]),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "leaves"
)]
/// Lists a company's leave requests, newest first.
pub async fn list_company_leaves(
    session: Session,
    pool: Extension<PgPool>,
    Extension(pagination): Extension<PaginationConfig>,
    Path(company_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let query = validate::query(query);
    reply(
        ResponseKey::Success,
        flow::list_for_company::<Leaves>(&pool, &session, pagination, &company_id, &query)
            .await,
    )
}

#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/leaves",
    params(
        ("user_id" = String, Path, description = "User id"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Page of the user's leave requests.", body = [LeaveResponse]),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "leaves"
)]
/// Lists the session user's own leave requests.
pub async fn list_user_leaves(
    session: Session,
    pool: Extension<PgPool>,
    Extension(pagination): Extension<PaginationConfig>,
    Path(user_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let query = validate::query(query);
    reply(
        ResponseKey::Success,
        flow::list_for_user::<Leaves>(&pool, &session, pagination, &user_id, &query).await,
    )
}

#[utoipa::path(
    patch,
    path = "/v1/leaves/{id}/status",
    request_body = ReviewRequest,
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request reviewed.", body = LeaveResponse),
        (status = 400, description = "Invalid status, already reviewed or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "leaves"
)]
/// Approves or rejects a pending leave request.
pub async fn review_leave(
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
        flow::review::<Leaves>(&pool, &session, &id, review.status).await,
    )
}

#[utoipa::path(
    delete,
    path = "/v1/leaves/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request deleted."),
        (status = 400, description = "Not pending, not the owner or invalid id."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "leaves"
)]
/// Withdraws the session user's pending leave request.
pub async fn delete_leave(
    session: Session,
    pool: Extension<PgPool>,
    Path(id): Path<String>,
) -> Response {
    reply(
        ResponseKey::Success,
        flow::withdraw::<Leaves>(&pool, &session, &id).await,
    )
}
