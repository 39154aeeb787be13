//! Taxonomy upload and lookup

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use mederror_common::taxonomy::{Category, TypeOption};
use mederror_common::Taxonomy;
use serde::Serialize;
use tracing::warn;

use super::{upload_text, ApiError, UploadQuery};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TaxonomyLoadResponse {
    pub filename: Option<String>,
    pub categories: usize,
    pub types: usize,
    pub generation: u64,
}

#[derive(Debug, Serialize)]
pub struct TaxonomyResponse {
    pub filename: Option<String>,
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub categories: Vec<Category>,
    /// Flat list for the reassignment dropdown
    pub options: Vec<TypeOption>,
}

/// POST /api/taxonomy?filename=
///
/// Body is the YAML text. The previous taxonomy stays active if parsing fails.
pub async fn load_taxonomy(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<TaxonomyLoadResponse>, ApiError> {
    let body = upload_text(body).map_err(|e| {
        warn!("Rejected taxonomy upload {:?}: {:?}", query.filename, e);
        e
    })?;
    let taxonomy = Taxonomy::from_yaml_str(&body).map_err(|e| {
        warn!("Rejected taxonomy upload {:?}: {}", query.filename, e);
        ApiError::from(e)
    })?;
    let categories = taxonomy.category_count();
    let types = taxonomy.type_count();

    let generation = {
        let mut session = state.session.write().await;
        let event = session.install_taxonomy(taxonomy, query.filename.clone());
        state.events.emit_lossy(event);
        session.generation()
    };

    Ok(Json(TaxonomyLoadResponse {
        filename: query.filename,
        categories,
        types,
        generation,
    }))
}

/// GET /api/taxonomy
pub async fn get_taxonomy(State(state): State<AppState>) -> Result<Json<TaxonomyResponse>, ApiError> {
    let session = state.session.read().await;
    let loaded = session
        .taxonomy_source()
        .ok_or_else(|| ApiError::NotFound("No taxonomy loaded".to_string()))?;

    Ok(Json(TaxonomyResponse {
        filename: loaded.filename.clone(),
        generation: loaded.generation,
        loaded_at: loaded.loaded_at,
        categories: loaded.value.categories().to_vec(),
        options: loaded.value.type_options(),
    }))
}
