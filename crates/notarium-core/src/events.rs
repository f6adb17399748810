//! Scope event types and the broadcast bus that distributes them.
//!
//! Sibling views (a sidebar file list, an open file page, a children list)
//! reload independently. When one view mutates the hierarchy it publishes a
//! scope event here and every subscriber decides for itself whether to
//! refresh. Views never reach into each other's state.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::NoteId;

/// A hierarchy change some other view may care about.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ScopeEvent {
    /// A note moved to a new parent (or to the file top level).
    ParentChanged {
        note_id: NoteId,
        previous_parent_id: Option<NoteId>,
        new_parent_id: Option<NoteId>,
    },
    /// A note was removed.
    NoteDeleted { note_id: NoteId },
    /// The set of neural files changed (create/rename/delete).
    FileListChanged,
}

impl ScopeEvent {
    /// Event type name, used for log fields and subscriber filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            ScopeEvent::ParentChanged { .. } => "parent_changed",
            ScopeEvent::NoteDeleted { .. } => "note_deleted",
            ScopeEvent::FileListChanged => "file_list_changed",
        }
    }
}

/// Broadcast-based event bus for distributing scope events to views.
///
/// Uses `tokio::sync::broadcast` with a configurable buffer size. Slow
/// receivers that fall behind get a `Lagged` error and miss events; a view
/// that lags simply reloads on its next event.
pub struct EventBus {
    tx: broadcast::Sender<ScopeEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Emit an event to all subscribers. With no active subscribers the
    /// event is silently dropped.
    pub fn emit(&self, event: ScopeEvent) {
        tracing::debug!(
            event_type = event.event_type(),
            subscriber_count = self.tx.receiver_count(),
            "scope event emitted"
        );
        let _ = self.tx.send(event);
    }

    /// Subscribe to scope events. Each subscriber gets its own independent
    /// stream.
    pub fn subscribe(&self) -> broadcast::Receiver<ScopeEvent> {
        self.tx.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(crate::defaults::EVENT_BUS_CAPACITY)
    }
}
