//! Authorization flow shared by every request kind.
//!
//! Handlers parse their inputs and call into here; this module decides who may
//! see, list, review or withdraw a request, then delegates to `storage`.
//! Requests outside the session's company are reported as not found.

use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::storage::{self, ListScope, RequestError, RequestKind};
use super::types::{ListQuery, RequestStatus};
use super::validate::parse_id;
use crate::api::handlers::auth::{check_belonging, check_session, Session};
use crate::api::handlers::envelope::{respond, ResponseKey};
use crate::api::handlers::pagination::{Paginated, PaginationConfig};

/// Turn a flow result into the response envelope.
pub(super) fn reply<T: Serialize>(key: ResponseKey, result: Result<T, RequestError>) -> Response {
    match result {
        Ok(data) => respond(key, data),
        Err(err) => err.into_response(),
    }
}

/// The session user must still belong to the session company before filing.
pub(super) async fn ensure_can_file(pool: &PgPool, session: &Session) -> Result<(), RequestError> {
    check_belonging(pool, session.company_id, session.user_id, session.company_id).await?;
    Ok(())
}

async fn load_scoped<K: RequestKind>(
    pool: &PgPool,
    session: &Session,
    id: Uuid,
) -> Result<K::Response, RequestError> {
    let response = storage::fetch_request::<K>(pool, id)
        .await?
        .ok_or(RequestError::NotFound)?;
    if K::record(&response).company_id == session.company_id {
        Ok(response)
    } else {
        Err(RequestError::NotFound)
    }
}

/// Owners may read their own requests; anyone else needs a role in the
/// request's company.
pub(super) async fn get<K: RequestKind>(
    pool: &PgPool,
    session: &Session,
    raw_id: &str,
) -> Result<K::Response, RequestError> {
    let id = parse_id(raw_id)?;
    let response = load_scoped::<K>(pool, session, id).await?;
    let (owner, company_id) = {
        let record = K::record(&response);
        (record.user_id, record.company_id)
    };

    if owner == session.user_id {
        check_session(pool, owner, session.user_id, session.company_id).await?;
    } else if session.has_role_in(company_id) {
        check_belonging(pool, company_id, session.user_id, session.company_id).await?;
    } else {
        return Err(RequestError::Denied);
    }
    Ok(response)
}

pub(super) async fn list_for_company<K: RequestKind>(
    pool: &PgPool,
    session: &Session,
    pagination: PaginationConfig,
    raw_company_id: &str,
    query: &ListQuery,
) -> Result<Paginated<K::Response>, RequestError> {
    let company_id = parse_id(raw_company_id)?;
    check_belonging(pool, company_id, session.user_id, session.company_id).await?;
    list::<K>(pool, ListScope::Company(company_id), pagination, query).await
}

pub(super) async fn list_for_user<K: RequestKind>(
    pool: &PgPool,
    session: &Session,
    pagination: PaginationConfig,
    raw_user_id: &str,
    query: &ListQuery,
) -> Result<Paginated<K::Response>, RequestError> {
    let user_id = parse_id(raw_user_id)?;
    check_session(pool, user_id, session.user_id, session.company_id).await?;
    list::<K>(pool, ListScope::User(user_id), pagination, query).await
}

async fn list<K: RequestKind>(
    pool: &PgPool,
    scope: ListScope,
    pagination: PaginationConfig,
    query: &ListQuery,
) -> Result<Paginated<K::Response>, RequestError> {
    let page = pagination.resolve(query.page.as_deref(), query.limit.as_deref());
    let status = query.status.as_deref().and_then(RequestStatus::parse);
    let (items, total) = storage::list_requests::<K>(pool, scope, status, page).await?;
    Ok(Paginated::new(items, page, total))
}

/// Approve or reject a pending request. The reviewer needs a role in the
/// request's company.
pub(super) async fn review<K: RequestKind>(
    pool: &PgPool,
    session: &Session,
    raw_id: &str,
    status: RequestStatus,
) -> Result<K::Response, RequestError> {
    let id = parse_id(raw_id)?;
    if status == RequestStatus::Pending {
        return Err(RequestError::Invalid("status must be approved or rejected"));
    }
    let response = load_scoped::<K>(pool, session, id).await?;
    let (company_id, current) = {
        let record = K::record(&response);
        (record.company_id, record.status)
    };

    if !session.has_role_in(company_id) {
        return Err(RequestError::Denied);
    }
    check_belonging(pool, company_id, session.user_id, session.company_id).await?;
    if current != RequestStatus::Pending {
        return Err(RequestError::Invalid("request was already reviewed"));
    }

    let updated = storage::update_status::<K>(pool, id, status, session.user_id)
        .await?
        .ok_or(RequestError::Invalid("request was already reviewed"))?;
    info!(
        table = K::TABLE,
        request_id = %id,
        status = status.as_str(),
        reviewer = %session.user_id,
        "request reviewed"
    );
    Ok(updated)
}

/// Owners may withdraw their own request while it is pending.
pub(super) async fn withdraw<K: RequestKind>(
    pool: &PgPool,
    session: &Session,
    raw_id: &str,
) -> Result<(), RequestError> {
    let id = parse_id(raw_id)?;
    let response = load_scoped::<K>(pool, session, id).await?;
    let (owner, current) = {
        let record = K::record(&response);
        (record.user_id, record.status)
    };

    check_session(pool, owner, session.user_id, session.company_id).await?;
    if current != RequestStatus::Pending {
        return Err(RequestError::Invalid("only pending requests can be deleted"));
    }
    if !storage::delete_pending::<K>(pool, id).await? {
        return Err(RequestError::Invalid("only pending requests can be deleted"));
    }
    info!(table = K::TABLE, request_id = %id, "request deleted");
    Ok(())
}
