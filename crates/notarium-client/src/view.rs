//! Scope view: the single mutation point for one scope's note list.
//!
//! Owns the notes of exactly one scope (global/today, a file's top level,
//! or a parent note's children). All hierarchy changes go through here so
//! optimistic local state, backend truth, undo, and event notification stay
//! in step. Mutations follow an explicit two-phase protocol: the local
//! change is `Proposed`, then either `Confirmed` by the backend or rolled
//! back and marked `Failed`. Rollback is uniform across operations, and
//! `delete_many` never applies partially.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tokio::time::Duration;
use tracing::{debug, info, instrument, warn};

use notarium_core::{
    defaults, sort_notes, CreateNoteRequest, Error, EventBus, MutationPhase, Note, NoteId,
    NoteStore, OrderMode, PendingMutation, PinAction, Result, Scope, ScopeEvent,
    UpdateNoteRequest,
};

use crate::gesture::DropIntent;
use crate::undo::{Notification, UndoCoordinator};

/// A scope-owned, pinnable, reparentable note list.
pub struct ScopeView {
    store: Arc<dyn NoteStore>,
    events: Arc<EventBus>,
    scope: Scope,
    order: Option<OrderMode>,
    hide_completed: bool,
    notes: Vec<Note>,
    loaded: bool,
    generation: u64,
    undo: UndoCoordinator,
    last_phase: Option<MutationPhase>,
}

impl ScopeView {
    pub fn new(store: Arc<dyn NoteStore>, events: Arc<EventBus>, scope: Scope) -> Self {
        let undo = UndoCoordinator::new(store.clone());
        Self {
            store,
            events,
            scope,
            order: None,
            hide_completed: false,
            notes: Vec::new(),
            loaded: false,
            generation: 0,
            undo,
            last_phase: None,
        }
    }

    /// Set the chronological order preference. `None` keeps the unset
    /// sentinel: the list is displayed in backend order until a real
    /// preference is resolved.
    pub fn set_order(&mut self, order: Option<OrderMode>) {
        self.order = order;
    }

    pub fn with_order(mut self, order: OrderMode) -> Self {
        self.order = Some(order);
        self
    }

    /// Hide completed notes from loaded lists.
    pub fn set_hide_completed(&mut self, hide: bool) {
        self.hide_completed = hide;
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn order(&self) -> Option<OrderMode> {
        self.order
    }

    /// Notes in backend-reported order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Whether an initial load has completed (possibly degraded to empty).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Phase of the most recent mutation attempt.
    pub fn last_phase(&self) -> Option<MutationPhase> {
        self.last_phase
    }

    /// The pending notification, if its window has not elapsed.
    pub fn notification(&self) -> Option<&Notification> {
        self.undo.current()
    }

    pub fn dismiss_notification(&mut self) {
        self.undo.dismiss();
    }

    /// Display order: the pinned set by pin position first, then the
    /// unpinned remainder in chronological order (identity while the order
    /// preference is unset).
    pub fn display(&self) -> Vec<Note> {
        let (mut pinned, unpinned): (Vec<Note>, Vec<Note>) =
            self.notes.iter().cloned().partition(|n| n.is_pinned);
        pinned.sort_by_key(|n| n.pin_position.unwrap_or(i32::MAX));
        pinned.extend(sort_notes(&unpinned, self.order));
        pinned
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    /// Start a load and return its generation token.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Apply a completed load. A load that was superseded by a newer one is
    /// discarded; the last completed load always wins.
    pub fn apply_load(&mut self, generation: u64, notes: Vec<Note>) -> bool {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "stale load discarded"
            );
            return false;
        }
        self.notes = if self.hide_completed {
            notes.into_iter().filter(|n| !n.completed).collect()
        } else {
            notes
        };
        self.loaded = true;
        true
    }

    /// Fetch the scope's notes. A read failure degrades to an empty list
    /// rather than propagating; the user re-triggers the load.
    #[instrument(skip(self), fields(subsystem = "client", component = "view", op = "reload", scope = self.scope.label()))]
    pub async fn reload(&mut self) -> Result<()> {
        let generation = self.begin_load();
        match self.store.list_scope(self.scope).await {
            Ok(notes) => {
                let count = notes.len();
                if self.apply_load(generation, notes) {
                    debug!(result_count = count, "scope loaded");
                }
            }
            Err(e) => {
                warn!(error = %e, "scope load failed, degrading to empty list");
                self.apply_load(generation, Vec::new());
            }
        }
        Ok(())
    }

    /// Wait out the post-mutation debounce, then reload. The reload
    /// supersedes any optimistic edit made in between.
    pub async fn settle(&mut self) -> Result<()> {
        tokio::time::sleep(Duration::from_millis(defaults::RELOAD_DEBOUNCE_MS)).await;
        self.reload().await
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Create a note in this scope. The title must not be blank. The new
    /// note is optimistically placed at the order-appropriate end; call
    /// [`Self::settle`] afterwards for the consistency reload.
    #[instrument(skip(self, title, description), fields(subsystem = "client", component = "view", op = "create"))]
    pub async fn create(&mut self, title: &str, description: &str) -> Result<Note> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("note title must not be empty".to_string()));
        }

        let mut req = CreateNoteRequest::new(title, description.trim());
        match self.scope {
            Scope::Children(parent_id) => req.parent_id = Some(parent_id),
            Scope::File(file_id) => req.file_id = Some(file_id),
            Scope::Recent => {}
        }
        // Top-level notes default to an end-of-day deadline.
        if req.parent_id.is_none() {
            req.deadline = Some(format!("23:59 {}", Utc::now().format("%d/%m/%Y")));
        }

        self.last_phase = Some(MutationPhase::Proposed);
        let note = match self.store.create(req).await {
            Ok(note) => note,
            Err(e) => {
                self.last_phase = Some(MutationPhase::Failed);
                return Err(e);
            }
        };
        self.last_phase = Some(MutationPhase::Confirmed);

        match OrderMode::resolve(self.order) {
            OrderMode::LatestFirst => self.notes.insert(0, note.clone()),
            OrderMode::LatestLast => self.notes.push(note.clone()),
        }
        info!(note_id = note.id, "note created");
        Ok(note)
    }

    /// Move a note under a new parent (`None` moves it to the file top
    /// level). Rejected with [`Error::Cycle`] before any mutation request
    /// when the target is the note itself or one of its descendants.
    #[instrument(skip(self), fields(subsystem = "client", component = "view", op = "reparent"))]
    pub async fn reparent(&mut self, note_id: NoteId, new_parent_id: Option<NoteId>) -> Result<()> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == note_id)
            .ok_or(Error::NoteNotFound(note_id))?;
        let note = self.notes[index].clone();

        let parent_title = match new_parent_id {
            Some(target_id) => Some(self.ensure_no_cycle(note_id, target_id).await?),
            None => None,
        };

        // Proposed: the note leaves this scope's list immediately.
        self.last_phase = Some(MutationPhase::Proposed);
        self.notes.remove(index);

        match self
            .store
            .update(note_id, UpdateNoteRequest::reparent(new_parent_id))
            .await
        {
            Ok(_) => {
                self.last_phase = Some(MutationPhase::Confirmed);
                let message = match &parent_title {
                    Some(parent) => format!("\"{}\" moved under \"{}\"", note.title, parent),
                    None => format!("\"{}\" moved to top level", note.title),
                };
                self.undo.record(
                    PendingMutation::Reparent {
                        note_id,
                        previous_parent_id: note.parent_id,
                        new_parent_id,
                    },
                    message,
                );
                self.events.emit(ScopeEvent::ParentChanged {
                    note_id,
                    previous_parent_id: note.parent_id,
                    new_parent_id,
                });
                info!(note_id, "note reparented");
                Ok(())
            }
            Err(e) => {
                // Uniform rollback: restore the optimistic removal.
                self.last_phase = Some(MutationPhase::Failed);
                self.notes.insert(index.min(self.notes.len()), note);
                warn!(note_id, error = %e, "reparent failed, local state restored");
                Err(e)
            }
        }
    }

    /// Pin a note so that exactly `position` pinned notes precede it in
    /// this scope. The backend owns the merged order, so a full reload
    /// follows instead of any local merge.
    #[instrument(skip(self), fields(subsystem = "client", component = "view", op = "pin"))]
    pub async fn pin(&mut self, note_id: NoteId, position: usize) -> Result<()> {
        let title = self
            .notes
            .iter()
            .find(|n| n.id == note_id)
            .map(|n| n.title.clone())
            .ok_or(Error::NoteNotFound(note_id))?;

        self.last_phase = Some(MutationPhase::Proposed);
        match self
            .store
            .pin(note_id, position as i32, self.scope.pin_context())
            .await
        {
            Ok(()) => {
                self.last_phase = Some(MutationPhase::Confirmed);
                self.undo.record(
                    PendingMutation::Pin {
                        note_id,
                        action: PinAction::Pin,
                    },
                    format!("\"{}\" pinned at position {}", title, position + 1),
                );
                self.reload().await?;
                info!(note_id, position, "note pinned");
                Ok(())
            }
            Err(e) => {
                self.last_phase = Some(MutationPhase::Failed);
                Err(e)
            }
        }
    }

    /// Clear a note's pin. A reload follows for the authoritative order.
    #[instrument(skip(self), fields(subsystem = "client", component = "view", op = "unpin"))]
    pub async fn unpin(&mut self, note_id: NoteId) -> Result<()> {
        self.last_phase = Some(MutationPhase::Proposed);
        match self.store.unpin(note_id).await {
            Ok(()) => {
                self.last_phase = Some(MutationPhase::Confirmed);
                self.undo.record(
                    PendingMutation::Pin {
                        note_id,
                        action: PinAction::Unpin,
                    },
                    "Note unpinned".to_string(),
                );
                self.reload().await?;
                info!(note_id, "note unpinned");
                Ok(())
            }
            Err(e) => {
                self.last_phase = Some(MutationPhase::Failed);
                Err(e)
            }
        }
    }

    /// Delete one note, keeping a snapshot for undo.
    #[instrument(skip(self), fields(subsystem = "client", component = "view", op = "delete"))]
    pub async fn delete_one(&mut self, note_id: NoteId) -> Result<()> {
        let index = self
            .notes
            .iter()
            .position(|n| n.id == note_id)
            .ok_or(Error::NoteNotFound(note_id))?;
        let snapshot = self.notes[index].clone();

        self.last_phase = Some(MutationPhase::Proposed);
        self.notes.remove(index);

        match self.store.delete(note_id).await {
            Ok(()) => {
                self.last_phase = Some(MutationPhase::Confirmed);
                self.undo.record(
                    PendingMutation::Delete {
                        snapshot: snapshot.clone(),
                    },
                    format!("\"{}\" deleted", snapshot.title),
                );
                self.events.emit(ScopeEvent::NoteDeleted { note_id });
                info!(note_id, "note deleted");
                Ok(())
            }
            Err(e) => {
                self.last_phase = Some(MutationPhase::Failed);
                self.notes.insert(index.min(self.notes.len()), snapshot);
                warn!(note_id, error = %e, "delete failed, local state restored");
                Err(e)
            }
        }
    }

    /// Delete several notes atomically. Local state is untouched until the
    /// backend confirms, so a failure leaves every note in place. Not
    /// undoable; any pending mutation is dismissed on success.
    #[instrument(skip(self), fields(subsystem = "client", component = "view", op = "delete_many", result_count = ids.len()))]
    pub async fn delete_many(&mut self, ids: &[NoteId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.last_phase = Some(MutationPhase::Proposed);
        match self.store.delete_many(ids).await {
            Ok(()) => {
                self.last_phase = Some(MutationPhase::Confirmed);
                self.notes.retain(|n| !ids.contains(&n.id));
                self.undo.dismiss();
                info!(count = ids.len(), "notes deleted");
                Ok(())
            }
            Err(e) => {
                self.last_phase = Some(MutationPhase::Failed);
                warn!(error = %e, "multi-delete failed, no local change applied");
                Err(e)
            }
        }
    }

    /// Undo the pending mutation, if any, then reload for backend truth.
    pub async fn undo(&mut self) -> Result<bool> {
        let undone = self.undo.undo().await?;
        if undone {
            self.reload().await?;
        }
        Ok(undone)
    }

    // =========================================================================
    // GESTURE WIRING
    // =========================================================================

    /// Apply a completed drag gesture's intent. Indices refer to the
    /// current [`Self::display`] order.
    pub async fn apply_intent(&mut self, intent: DropIntent) -> Result<()> {
        let display = self.display();
        match intent {
            DropIntent::Reparent { source, target } => {
                let source_id = Self::id_at(&display, source)?;
                let target_id = Self::id_at(&display, target)?;
                self.reparent(source_id, Some(target_id)).await
            }
            DropIntent::Pin { source, position } => {
                let source_id = Self::id_at(&display, source)?;
                self.pin(source_id, position).await
            }
        }
    }

    /// Ids of every descendant of a note, for the gesture interpreter's
    /// forbidden-target set.
    pub async fn collect_descendants(&self, note_id: NoteId) -> Result<HashSet<NoteId>> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::from([note_id]);
        while let Some(current) = queue.pop_front() {
            for child in self.store.list_children(current).await? {
                if seen.insert(child.id) {
                    queue.push_back(child.id);
                }
            }
        }
        Ok(seen)
    }

    fn id_at(display: &[Note], index: usize) -> Result<NoteId> {
        display
            .get(index)
            .map(|n| n.id)
            .ok_or_else(|| Error::Internal(format!("gesture index {} out of bounds", index)))
    }

    /// Walk ancestors of `target_id`; error if `note_id` is among them.
    /// Returns the target's title for the notification message.
    async fn ensure_no_cycle(&self, note_id: NoteId, target_id: NoteId) -> Result<String> {
        let mut cursor = target_id;
        let mut target_title: Option<String> = None;
        for _ in 0..defaults::MAX_ANCESTOR_DEPTH {
            if cursor == note_id {
                return Err(Error::Cycle { note_id, target_id });
            }
            let current = self.store.fetch(cursor).await?;
            if target_title.is_none() {
                target_title = Some(current.title.clone());
            }
            match current.parent_id {
                Some(parent) => cursor = parent,
                None => {
                    return Ok(target_title.unwrap_or_default());
                }
            }
        }
        Err(Error::Internal(format!(
            "ancestor chain of note {} exceeds {} levels",
            target_id,
            defaults::MAX_ANCESTOR_DEPTH
        )))
    }
}
