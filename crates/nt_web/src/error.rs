//! JSON error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 400 - missing or invalid parameters.
    BadRequest(String),
    /// 404 - the topic is not tracked.
    NotFound(String),
    /// 409 - the topic is already tracked.
    Conflict(String),
    /// 500
    Internal(String),
    /// 503 - the topic config is locked by someone else.
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<nt_core::Error> for ApiError {
    fn from(err: nt_core::Error) -> Self {
        match err {
            nt_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            err @ nt_core::Error::LockTimeout { .. } => {
                tracing::error!("{}", err);
                ApiError::ServiceUnavailable(err.to_string())
            }
            err => {
                tracing::error!("{}", err);
                ApiError::Internal(err.to_string())
            }
        }
    }
}
