//! Downloads of the edited record set

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use mederror_common::export::ExportFormat;

use super::error::no_annotations;
use super::ApiError;
use crate::AppState;

/// GET /api/export/:format
///
/// `format` is `json` or `csv`. Served as an attachment named
/// `<original basename>_updated.<ext>`.
pub async fn export_annotations(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, ApiError> {
    let format: ExportFormat = format.parse()?;

    let file = state
        .session
        .read()
        .await
        .export(format)?
        .ok_or_else(no_annotations)?;

    let safe_name: String = file
        .file_name
        .chars()
        .map(|c| if c == '"' || c.is_control() { '_' } else { c })
        .collect();
    let disposition = format!("attachment; filename=\"{}\"", safe_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    )
        .into_response())
}
