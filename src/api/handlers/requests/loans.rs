//! Loan request endpoints.
//!
//! A loan is repaid in monthly installments; the amount and installment count
//! are recorded as requested and never recalculated here.

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
    types::{CreateLoanRequest, ListQuery, LoanResponse, RequestRecord, ReviewRequest},
    validate,
};
use crate::api::handlers::auth::Session;
use crate::api::handlers::envelope::ResponseKey;
use crate::api::handlers::pagination::PaginationConfig;

pub(super) struct Loans;

impl RequestKind for Loans {
    const TABLE: &'static str = "loans";
    const DETAIL_COLUMNS: &'static str = "amount, installments";
    type Response = LoanResponse;

    fn from_row(record: RequestRecord, row: &PgRow) -> Result<Self::Response, sqlx::Error> {
        Ok(LoanResponse {
            record,
            amount: row.try_get("amount")?,
            installments: row.try_get("installments")?,
        })
    }

    fn record(response: &Self::Response) -> &RequestRecord {
        &response.record
    }
}

pub(super) fn routes() -> Router {
    Router::new()
        .route("/v1/loans", post(create_loan))
        .route("/v1/loans/:id", get(get_loan).delete(delete_loan))
        .route("/v1/loans/:id/status", patch(review_loan))
        .route("/v1/companies/:company_id/loans", get(list_company_loans))
        .route("/v1/users/:user_id/loans", get(list_user_loans))
}

#[utoipa::path(
    post,
    path = "/v1/loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Request filed.", body = LoanResponse),
        (status = 400, description = "Invalid input or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "loans"
)]
/// Files a pending loan request for the session user.
pub async fn create_loan(
    session: Session,
    pool: Extension<PgPool>,
    payload: Result<Json<CreateLoanRequest>, JsonRejection>,
) -> Response {
    reply(ResponseKey::Created, create(&pool, &session, payload).await)
}

async fn create(
    pool: &PgPool,
    session: &Session,
    payload: Result<Json<CreateLoanRequest>, JsonRejection>,
) -> Result<LoanResponse, RequestError> {
    let payload = validate::body(payload)?;
    let amount = validate::amount(payload.amount)?;
    let installments = validate::installments(payload.installments)?;
    let reason = validate::reason(&payload.reason)?;
    flow::ensure_can_file(pool, session).await?;

    let sql = insert_sql::<Loans>("amount, installments", "$4, $5");
    let row = sqlx::query(&sql)
        .bind(session.user_id)
        .bind(session.company_id)
        .bind(reason)
        .bind(amount)
        .bind(installments)
        .fetch_one(pool)
        .await?;
    let response = response_from_row::<Loans>(&row)?;
    info!(request_id = %response.record.id, user_id = %session.user_id, "loan requested");
    Ok(response)
}

#[utoipa::path(
    get,
    path = "/v1/loans/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request.", body = LoanResponse),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "loans"
)]
/// Returns one request to its owner or to a role holder in its company.
pub async fn get_loan(
    session: Session,
    pool: Extension<PgPool>,
    Path(id): Path<String>,
) -> Response {
    reply(
        ResponseKey::Success,
        flow::get::<Loans>(&pool, &session, &id).await,
    )
}

#[utoipa::path(
    get,
    path = "/v1/companies/{company_id}/loans",
    params(
        ("company_id" = String, Path, description = "Company id"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Page of the company's loan requests.", body = [LoanResponse]),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "loans"
)]
/// Lists a company's loan requests, newest first.
pub async fn list_company_loans(
    session: Session,
    pool: Extension<PgPool>,
    Extension(pagination): Extension<PaginationConfig>,
    Path(company_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let query = validate::query(query);
    reply(
        ResponseKey::Success,
        flow::list_for_company::<Loans>(&pool, &session, pagination, &company_id, &query)
            .await,
    )
}

#[utoipa::path(
    get,
    path = "/v1/users/{user_id}/loans",
    params(
        ("user_id" = String, Path, description = "User id"),
        ListQuery
    ),
    responses(
        (status = 200, description = "Page of the user's loan requests.", body = [LoanResponse]),
        (status = 400, description = "Invalid id or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
    ),
    security(("bearer" = [])),
    tag = "loans"
)]
/// Lists the session user's own loan requests.
pub async fn list_user_loans(
    session: Session,
    pool: Extension<PgPool>,
    Extension(pagination): Extension<PaginationConfig>,
    Path(user_id): Path<String>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let query = validate::query(query);
    reply(
        ResponseKey::Success,
        flow::list_for_user::<Loans>(&pool, &session, pagination, &user_id, &query).await,
    )
}

#[utoipa::path(
    patch,
    path = "/v1/loans/{id}/status",
    request_body = ReviewRequest,
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request reviewed.", body = LoanResponse),
        (status = 400, description = "Invalid status, already reviewed or membership denied."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "loans"
)]
/// Approves or rejects a pending loan request.
pub async fn review_loan(
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
        flow::review::<Loans>(&pool, &session, &id, review.status).await,
    )
}

#[utoipa::path(
    delete,
    path = "/v1/loans/{id}",
    params(("id" = String, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request deleted."),
        (status = 400, description = "Not pending, not the owner or invalid id."),
        (status = 401, description = "Missing or invalid credential."),
        (status = 404, description = "Request not found."),
    ),
    security(("bearer" = [])),
    tag = "loans"
)]
/// Withdraws the session user's pending loan request.
pub async fn delete_loan(
    session: Session,
    pool: Extension<PgPool>,
    Path(id): Path<String>,
) -> Response {
    reply(
        ResponseKey::Success,
        flow::withdraw::<Loans>(&pool, &session, &id).await,
    )
}
