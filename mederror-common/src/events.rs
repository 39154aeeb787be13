//! Session change events
//!
//! Emitted whenever the loaded data changes so connected browsers can
//! re-fetch statistics without reloading the page.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Change notifications for one viewer session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// A taxonomy file replaced the previous taxonomy
    TaxonomyLoaded {
        filename: Option<String>,
        categories: usize,
        types: usize,
        generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An annotation file replaced the previous record set
    AnnotationsLoaded {
        filename: Option<String>,
        records: usize,
        schema: String,
        generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The record set was cleared
    AnnotationsCleared {
        generation: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// One error assignment was re-categorized
    RecordEdited {
        record_id: u64,
        error_index: usize,
        category: String,
        error_type: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl SessionEvent {
    /// Event name used as the SSE `event:` field
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::TaxonomyLoaded { .. } => "TaxonomyLoaded",
            SessionEvent::AnnotationsLoaded { .. } => "AnnotationsLoaded",
            SessionEvent::AnnotationsCleared { .. } => "AnnotationsCleared",
            SessionEvent::RecordEdited { .. } => "RecordEdited",
        }
    }
}

/// Broadcast bus for [`SessionEvent`]s.
///
/// Slow subscribers lag and drop old events rather than blocking editors.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }

    /// Receivers currently alive, i.e. connected SSE streams
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
