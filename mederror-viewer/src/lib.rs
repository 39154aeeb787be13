//! mederror-viewer library - annotation review service
//!
//! Local HTTP service holding one review session in memory. The embedded
//! page uploads taxonomy and annotation files, browses records, reassigns
//! error types and downloads the edited set.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use mederror_common::events::EventBus;
use mederror_common::Session;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod pagination;
pub mod report;

/// Upper bound for uploaded file bodies
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Buffered session events per SSE subscriber
const EVENT_CAPACITY: usize = 64;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Current taxonomy and record set
    pub session: Arc<RwLock<Session>>,
    /// Change notifications for connected pages
    pub events: EventBus,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            events: EventBus::new(EVENT_CAPACITY),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Session::new())
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, put};

    let api = Router::new()
        .route("/api/buildinfo", get(api::get_build_info))
        .route("/api/events", get(api::event_stream))
        .route(
            "/api/taxonomy",
            get(api::get_taxonomy).post(api::load_taxonomy),
        )
        .route(
            "/api/annotations",
            get(api::list_annotations)
                .post(api::load_annotations)
                .delete(api::clear_annotations),
        )
        .route(
            "/api/annotations/:id/errors/:index",
            put(api::reassign_error),
        )
        .route("/api/stats/summary", get(api::get_summary))
        .route("/api/stats/judgements", get(api::get_judgements))
        .route("/api/stats/errors", get(api::get_errors))
        .route("/api/stats/agreement", get(api::get_agreement))
        .route("/api/export/:format", get(api::export_annotations));

    let ui = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::health_routes());

    Router::new()
        .merge(api)
        .merge(ui)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
