//! HTTP API handlers for mederror-viewer

pub mod annotations;
pub mod buildinfo;
pub mod error;
pub mod export;
pub mod health;
pub mod sse;
pub mod stats;
pub mod taxonomy;
pub mod ui;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use serde::Deserialize;

use crate::MAX_BODY_BYTES;

pub use annotations::{clear_annotations, list_annotations, load_annotations, reassign_error};
pub use buildinfo::get_build_info;
pub use error::ApiError;
pub use export::export_annotations;
pub use health::health_routes;
pub use sse::event_stream;
pub use stats::{get_agreement, get_errors, get_judgements, get_summary};
pub use taxonomy::{get_taxonomy, load_taxonomy};
pub use ui::{serve_app_js, serve_index};

/// `?filename=` on upload endpoints; the browser only sends the file's text
#[derive(Debug, Default, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// Upload body as text.
///
/// Over-limit and non-UTF-8 bodies become JSON errors instead of axum's
/// plain-text rejections.
pub(crate) fn upload_text(body: Result<Bytes, BytesRejection>) -> Result<String, ApiError> {
    let bytes = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(format!("Upload exceeds {} bytes", MAX_BODY_BYTES))
        } else {
            ApiError::BadRequest(rejection.body_text())
        }
    })?;
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ApiError::BadRequest(format!("Upload is not UTF-8 text: {}", e)))
}
