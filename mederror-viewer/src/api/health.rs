//! Liveness and session status
//!
//! `/health` always answers 200. Besides liveness it reports what the
//! session holds, so a script can poll until a preload has been picked up.

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use mederror_common::session::Loaded;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub generation: u64,
    pub taxonomy: Option<LoadedFile>,
    pub annotations: Option<LoadedFile>,
    /// Pages currently subscribed to `/api/events`
    pub listeners: usize,
}

/// One loaded file; `items` counts categories or records
#[derive(Debug, Serialize)]
pub struct LoadedFile {
    pub filename: Option<String>,
    pub items: usize,
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
}

impl LoadedFile {
    fn from_loaded<T>(loaded: &Loaded<T>, items: usize) -> Self {
        Self {
            filename: loaded.filename.clone(),
            items,
            generation: loaded.generation,
            loaded_at: loaded.loaded_at,
        }
    }
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let session = state.session.read().await;

    Json(HealthResponse {
        status: "ok",
        module: "mederror-viewer",
        version: env!("CARGO_PKG_VERSION"),
        generation: session.generation(),
        taxonomy: session
            .taxonomy_source()
            .map(|t| LoadedFile::from_loaded(t, t.value.category_count())),
        annotations: session
            .annotations_source()
            .map(|a| LoadedFile::from_loaded(a, a.value.len())),
        listeners: state.events.subscriber_count(),
    })
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
