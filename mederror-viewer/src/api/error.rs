//! API error responses
//!
//! Every failure is returned as `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

#[derive(Debug)]
pub enum ApiError {
    /// Uploaded text could not be parsed
    BadRequest(String),
    /// No dataset of the requested kind is loaded
    NotFound(String),
    PayloadTooLarge(String),
    Internal(String),
}

impl From<mederror_common::Error> for ApiError {
    fn from(e: mederror_common::Error) -> Self {
        use mederror_common::Error;
        match e {
            Error::Parse(msg) => ApiError::BadRequest(msg),
            Error::Config(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

pub(crate) fn no_annotations() -> ApiError {
    ApiError::NotFound("No annotation file loaded".to_string())
}
