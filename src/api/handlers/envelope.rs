//! JSON response envelope shared by every API handler.
//!
//! Bodies are always `{"responseKey": <code>, "data": <payload or null>}` and
//! the HTTP status is derived from the code, so handlers only pick a key.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseKey {
    Success,
    Created,
    InvalidRequest,
    Unauthorized,
    DataNotFound,
    UnknownError,
}

impl ResponseKey {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            Self::Created => StatusCode::CREATED,
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::DataNotFound => StatusCode::NOT_FOUND,
            Self::UnknownError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub response_key: ResponseKey,
    pub data: Option<T>,
}

/// Respond with `data` under `key`.
pub fn respond<T: Serialize>(key: ResponseKey, data: T) -> Response {
    (
        key.status(),
        Json(Envelope {
            response_key: key,
            data: Some(data),
        }),
    )
        .into_response()
}

/// Respond with `data: null` under `key`.
pub fn reject(key: ResponseKey) -> Response {
    (
        key.status(),
        Json(Envelope::<()> {
            response_key: key,
            data: None,
        }),
    )
        .into_response()
}
