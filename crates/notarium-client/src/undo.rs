//! Undo/notification coordinator.
//!
//! Tracks at most one reversible mutation at a time. Recording a new one
//! replaces the old and restarts the display window; once the window
//! elapses the mutation silently expires and `current()` turns empty.
//! `undo()` synthesizes the inverse backend call for the tracked variant
//! and dismisses on success.

use std::sync::Arc;

use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use notarium_core::{
    defaults, CreateNoteRequest, NoteStore, PendingMutation, PinAction, Result, UpdateNoteRequest,
};

/// The user-visible record of the pending mutation.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub mutation: PendingMutation,
}

struct Pending {
    notification: Notification,
    expires_at: Instant,
}

/// Coordinator for the single pending mutation and its undo window.
pub struct UndoCoordinator {
    store: Arc<dyn NoteStore>,
    window: Duration,
    pending: Option<Pending>,
}

impl UndoCoordinator {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self::with_window(store, Duration::from_millis(defaults::UNDO_DISPLAY_MS))
    }

    /// Coordinator with a custom display window.
    pub fn with_window(store: Arc<dyn NoteStore>, window: Duration) -> Self {
        Self {
            store,
            window,
            pending: None,
        }
    }

    /// Track a freshly applied mutation, replacing any existing one and
    /// restarting the display window.
    pub fn record(&mut self, mutation: PendingMutation, message: impl Into<String>) {
        let message = message.into();
        debug!(message = %message, "pending mutation recorded");
        self.pending = Some(Pending {
            notification: Notification { message, mutation },
            expires_at: Instant::now() + self.window,
        });
    }

    /// The pending mutation, if one exists and its window has not elapsed.
    /// Expiry has no side effects beyond the notification disappearing.
    pub fn current(&self) -> Option<&Notification> {
        match &self.pending {
            Some(p) if Instant::now() < p.expires_at => Some(&p.notification),
            _ => None,
        }
    }

    /// Clear the pending mutation and its window.
    pub fn dismiss(&mut self) {
        self.pending = None;
    }

    /// Reverse the pending mutation against the backend, then dismiss.
    ///
    /// Returns `Ok(true)` when a mutation was undone, `Ok(false)` when there
    /// was nothing to undo. A deleted note is recreated under a new id; a
    /// reparent goes back to the previous parent; a pin is cleared. Undoing
    /// an unpin cannot restore the lost position, so only the caller's
    /// follow-up reload applies. On backend failure the mutation stays
    /// pending for a retry within the window.
    pub async fn undo(&mut self) -> Result<bool> {
        if self.current().is_none() {
            self.pending = None;
            return Ok(false);
        }
        let notification = self.pending.as_ref().map(|p| p.notification.clone());
        let Some(notification) = notification else {
            return Ok(false);
        };

        match &notification.mutation {
            PendingMutation::Delete { snapshot } => {
                let req = CreateNoteRequest::from_snapshot(snapshot);
                let recreated = self.store.create(req).await?;
                info!(
                    note_id = recreated.id,
                    previous_id = snapshot.id,
                    "delete undone, note recreated"
                );
            }
            PendingMutation::Reparent {
                note_id,
                previous_parent_id,
                ..
            } => {
                self.store
                    .update(*note_id, UpdateNoteRequest::reparent(*previous_parent_id))
                    .await?;
                info!(note_id, "reparent undone");
            }
            PendingMutation::Pin { note_id, action } => match action {
                PinAction::Pin => {
                    self.store.unpin(*note_id).await?;
                    info!(note_id, "pin undone");
                }
                PinAction::Unpin => {
                    debug!(note_id, "unpin undo falls back to reload");
                }
            },
        }

        self.dismiss();
        Ok(true)
    }
}
