//! Advance-salary request endpoints.

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
        AdvanceSalaryResponse, CreateAdvanceSalaryRequest, ListQuery, RequestRecord,
        ReviewRequest,
    },
    validate,
};
use crate::api::handlers::auth::Session;
use crate::api::handlers::envelope::ResponseKey;
use crate::api::handlers::pagination::PaginationConfig;

pub(super) struct AdvanceSalaries;

impl RequestKind for AdvanceSalaries {
    const TABLE: &'static str = "advance_salaries";
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

pub(super) fn routes() -> Router {
    Router::new()
        .route("/v1/advance-salaries", post(create_advance_salary))
        .route(
            "/v1/advance-salaries/:id",
            get(get_advance_salary).delete(delete_advance_salary),
        )
        .route("/v1/advance-salaries/:id/status", patch(review_advance_salary))
        .route(
            "/v1/companies/:company_id/advance-salaries",
            get(list_company_advance_salaries),
        )
        .route(
            "/v1/users/:user_id/advance-salaries",
            get(list_user_advance_salaries),
        )
}

#[utoipa::path(
    post,
    path = "/v1/advance-salaries",
    request_body = CreateAdvanceSalaryRequest,
    responses(
        (status = 201, description = "Advance salary requested.", body = AdvanceSalaryResponse),
        (status = 400, description = "Invalid input or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "advance-salaries"
)]
/// Files a pending advance-salary request for the session user.
pub async fn create_advance_salary(
    session: Session,
    pool: Extension<PgPool>,
    payload: Result<Json<CreateAdvanceSalaryRequest>, JsonRejection>,
) -> Response {
    reply(ResponseKey::Created, create(&pool, &session, payload).await)
}

async fn create(
    pool: &PgPool,
    session: &Session,
    payload: Result<Json<CreateAdvanceSalaryRequest>, JsonRejection>,
) -> Result<AdvanceSalaryResponse, RequestError> {
    let payload = validate::body(payload)?;
    let amount = validate::amount(payload.amount)?;
    let reason = validate::reason(&payload.reason)?;
    flow::ensure_can_file(pool, session).await?;

    let sql = insert_sql::<AdvanceSalaries>("amount", "$4");
    let row = sqlx::query(&sql)
        .bind(session.user_id)
        .bind(session.company_id)
        .bind(reason)
        .bind(amount)
        .fetch_one(pool)
        .await?;
    let response = response_from_row::<AdvanceSalaries>(&row)?;
    info!(request_id = %response.record.id, user_id = %session.user_id, "advance salary requested");
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/v1/advance-salaries/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Advance salary request.", body = AdvanceSalaryResponse),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "advance-salaries"
)]
/// Returns one request to its owner or to a role holder in its company.
pub async fn get_advance_salary(
    session: Session,
    pool: Extension<PgPool>,
    Path(id): Path<String>,
) -> Response {
    reply(
        ResponseKey::Success,
        flow::get::<AdvanceSalaries>(&pool, &session, &id).await,
    )
}

#[utoipa::path(
    get,
    path = "/v1/companies/{company_id}/advance-salaries",
    params(
        ("company_id" = String, Path, description = "Company id"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Page of the company's advance salary requests.", body = [AdvanceSalaryResponse]),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "advance-salaries"
)]
/// Lists a company's advance-salary requests, newest first.
pub async fn list_company_advance_salaries(
    session: Session,
    pool: Extension<PgPool>,
    Extension(pagination): Extension<PaginationConfig>,
    Path(company_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let query = validate::query(query);
    reply(
        ResponseKey::Success,
        flow::list_for_company::<AdvanceSalaries>(&pool, &session, pagination, &company_id, &query)
            .await,
    )
}

#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/advance-salaries",
    params(
        ("user_id" = String, Path, description = "User id"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Page of the user's advance salary requests.", body = [AdvanceSalaryResponse]),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "advance-salaries"
)]
/// Lists the session user's own advance-salary requests.
pub async fn list_user_advance_salaries(
    session: Session,
    pool: Extension<PgPool>,
    Extension(pagination): Extension<PaginationConfig>,
    Path(user_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let query = validate::query(query);
    reply(
        ResponseKey::Success,
        flow::list_for_user::<AdvanceSalaries>(&pool, &session, pagination, &user_id, &query).await,
    )
}

#[utoipa::path(
    patch,
    path = "/v1/advance-salaries/{id}/status",
    request_body = ReviewRequest,
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request reviewed.", body = AdvanceSalaryResponse),
        (status = 400, description = "Invalid status, already reviewed or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "advance-salaries"
)]
/// Approves or rejects a pending advance-salary request.
pub async fn review_advance_salary(
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
        flow::review::<AdvanceSalaries>(&pool, &session, &id, review.status).await,
    )
}

#[utoipa::path(
    delete,
    path = "/v1/advance-salaries/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request deleted."),
        (status = 400, description = "Not pending, not the owner or invalid id."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "advance-salaries"
)]
/// Withdraws the session user's pending advance-salary request.
pub async fn delete_advance_salary(
    session: Session,
    pool: Extension<PgPool>,
    Path(id): Path<String>,
) -> Response {
    reply(
        ResponseKey::Success,
        flow::withdraw::<AdvanceSalaries>(&pool, &session, &id).await,
    )
}
