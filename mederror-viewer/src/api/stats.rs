//! Statistics over the current record set
//!
//! Recomputed on every request, so edits show up immediately.

use axum::{
    extract::{Query, State},
    Json,
};
use mederror_common::aggregate::{self, ErrorHistogram, Histogram, Summary};
use mederror_common::agreement::{label_agreement, Agreement};
use serde::Deserialize;

use super::error::no_annotations;
use super::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ErrorsQuery {
    /// Restrict to records with this raw judgement
    pub judgement: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AgreementQuery {
    #[serde(default)]
    pub case_sensitive: bool,
}

/// GET /api/stats/summary
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<Summary>, ApiError> {
    let session = state.session.read().await;
    session.summary().map(Json).ok_or_else(no_annotations)
}

/// GET /api/stats/judgements
pub async fn get_judgements(State(state): State<AppState>) -> Result<Json<Histogram>, ApiError> {
    let session = state.session.read().await;
    let set = session.annotations().ok_or_else(no_annotations)?;
    Ok(Json(aggregate::judgement_histogram(set.records())))
}

/// GET /api/stats/errors?judgement=
pub async fn get_errors(
    State(state): State<AppState>,
    Query(query): Query<ErrorsQuery>,
) -> Result<Json<ErrorHistogram>, ApiError> {
    let session = state.session.read().await;
    let set = session.annotations().ok_or_else(no_annotations)?;
    let histogram = match query.judgement.as_deref() {
        Some(judgement) => aggregate::error_histogram_for(set.records(), judgement),
        None => aggregate::error_histogram(set.records()),
    };
    Ok(Json(histogram))
}

/// GET /api/stats/agreement?case_sensitive=
pub async fn get_agreement(
    State(state): State<AppState>,
    Query(query): Query<AgreementQuery>,
) -> Result<Json<Agreement>, ApiError> {
    let session = state.session.read().await;
    let set = session.annotations().ok_or_else(no_annotations)?;
    Ok(Json(label_agreement(set.records(), query.case_sensitive)))
}
