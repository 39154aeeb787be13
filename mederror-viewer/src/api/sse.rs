//! Server-Sent Events (SSE) for session changes

use crate::AppState;
use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

/// GET /api/events - SSE event stream
///
/// Streams events:
/// - ConnectionStatus (once, on connect)
/// - TaxonomyLoaded, AnnotationsLoaded, AnnotationsCleared, RecordEdited
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    mederror_common::sse::create_session_sse_stream("mederror-viewer", state.events.subscribe())
}
