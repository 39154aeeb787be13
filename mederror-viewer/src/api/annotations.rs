//! Annotation upload, browsing and error reassignment

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, Query, State},
    Json,
};
use mederror_common::editor::EditOutcome;
use mederror_common::{AnnotationRecord, AnnotationSet};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::error::no_annotations;
use super::{upload_text, ApiError, UploadQuery};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AnnotationsLoadResponse {
    pub filename: Option<String>,
    pub records: usize,
    pub schema: String,
    pub generation: u64,
}

/// Query parameters for record browsing
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: usize,

    /// Only records with exactly this raw judgement
    pub judgement: Option<String>,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
pub struct RecordPage {
    pub filename: Option<String>,
    pub schema: String,
    pub generation: u64,
    /// Records matching the filter, across all pages
    pub total_records: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub records: Vec<AnnotationRecord>,
}

#[derive(Debug, Deserialize)]
pub struct ReassignRequest {
    #[serde(rename = "type")]
    pub error_type: String,
}

#[derive(Debug, Serialize)]
pub struct ReassignResponse {
    #[serde(flatten)]
    pub outcome: EditOutcome,
    /// The record after the edit; absent when the target did not resolve
    pub record: Option<AnnotationRecord>,
}

/// POST /api/annotations?filename=
///
/// Body is the JSON text. The previous record set stays active if parsing fails.
pub async fn load_annotations(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AnnotationsLoadResponse>, ApiError> {
    let body = upload_text(body).map_err(|e| {
        warn!("Rejected annotation upload {:?}: {:?}", query.filename, e);
        e
    })?;
    let set = AnnotationSet::from_json_str(&body).map_err(|e| {
        warn!("Rejected annotation upload {:?}: {}", query.filename, e);
        ApiError::from(e)
    })?;
    let records = set.len();
    let schema = set.schema().name().to_string();

    let generation = {
        let mut session = state.session.write().await;
        let event = session.install_annotations(set, query.filename.clone());
        state.events.emit_lossy(event);
        session.generation()
    };

    Ok(Json(AnnotationsLoadResponse {
        filename: query.filename,
        records,
        schema,
        generation,
    }))
}

/// DELETE /api/annotations
pub async fn clear_annotations(State(state): State<AppState>) -> Json<serde_json::Value> {
    let mut session = state.session.write().await;
    let event = session.clear_annotations();
    state.events.emit_lossy(event);
    Json(serde_json::json!({ "generation": session.generation() }))
}

/// GET /api/annotations?page=&judgement=
pub async fn list_annotations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RecordPage>, ApiError> {
    let session = state.session.read().await;
    let loaded = session.annotations_source().ok_or_else(no_annotations)?;
    let set = &loaded.value;

    let matching: Vec<&AnnotationRecord> = match query.judgement.as_deref() {
        Some(judgement) => set.with_judgement(judgement).collect(),
        None => set.records().iter().collect(),
    };
    let pagination = calculate_pagination(matching.len(), query.page);

    Ok(Json(RecordPage {
        filename: loaded.filename.clone(),
        schema: set.schema().name().to_string(),
        generation: loaded.generation,
        total_records: matching.len(),
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        records: pagination
            .slice(&matching)
            .iter()
            .map(|r| (*r).clone())
            .collect(),
    }))
}

/// PUT /api/annotations/:id/errors/:index
///
/// Always 200: an unknown record or index is reported as `no_target`
/// rather than failing, and a type missing from the taxonomy keeps the
/// error's category.
pub async fn reassign_error(
    State(state): State<AppState>,
    Path((record_id, error_index)): Path<(u64, usize)>,
    Json(request): Json<ReassignRequest>,
) -> Json<ReassignResponse> {
    let mut session = state.session.write().await;
    let (outcome, event) = session.reassign(record_id, error_index, &request.error_type);

    if let Some(event) = event {
        info!(
            "Record {} error {} reassigned to {:?}",
            record_id, error_index, request.error_type
        );
        state.events.emit_lossy(event);
    }

    let record = if outcome.changed_anything() {
        session
            .annotations()
            .and_then(|set| set.get(record_id))
            .cloned()
    } else {
        None
    };

    Json(ReassignResponse { outcome, record })
}
