//! Server-Sent Events (SSE) utilities
//!
//! Streams [`SessionEvent`]s to a browser, with a heartbeat so proxies and
//! the page's connection indicator notice a dead server.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::events::SessionEvent;

/// Heartbeat period for idle connections
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Create an SSE stream forwarding session events.
///
/// The first message is a `ConnectionStatus: connected` event; after that
/// every event received on `rx` is sent as JSON under its
/// [`SessionEvent::event_type`] name.
///
/// # Example
/// ```rust,ignore
/// pub async fn event_stream(
///     State(state): State<AppState>,
/// ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
///     mederror_common::sse::create_session_sse_stream("mederror-viewer", state.events.subscribe())
/// }
/// ```
pub fn create_session_sse_stream(
    service_name: &'static str,
    mut rx: broadcast::Receiver<SessionEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} session events", service_name);

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    match Event::default().event(event.event_type()).json_data(&event) {
                        Ok(sse_event) => {
                            yield Ok(sse_event);
                        }
                        Err(e) => warn!("SSE: failed to encode {}: {}", event.event_type(), e),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("SSE: client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => {
                    info!("SSE: {} event bus closed", service_name);
                    break;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(HEARTBEAT_INTERVAL)
            .text("heartbeat"),
    )
}
