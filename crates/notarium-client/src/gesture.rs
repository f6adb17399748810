//! Drag/drop gesture interpreter.
//!
//! A pure state machine that maps pointer gesture progress over a note list
//! to at most one mutation intent per gesture. One gesture is active per
//! list at a time. The interpreter never touches the backend; the scope
//! view consumes the emitted intent.

use std::collections::HashSet;

use notarium_core::NoteId;
use tracing::trace;

/// Drop-affordance region within a hovered note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropZone {
    /// Top strip: pin the dragged note above the hovered one.
    PinAbove,
    /// Bottom strip: pin the dragged note below the hovered one.
    PinBelow,
    /// Body: make the dragged note a child of the hovered one.
    Parent,
}

/// Gesture progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging {
        source: usize,
    },
    Hovering {
        source: usize,
        target: usize,
        zone: DropZone,
    },
}

/// The single mutation intent a completed gesture emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropIntent {
    /// Make the note at `source` a child of the note at `target`.
    Reparent { source: usize, target: usize },
    /// Pin the note at `source` so that exactly `position` pinned notes
    /// precede it.
    Pin { source: usize, position: usize },
}

/// Per-list drag gesture state.
#[derive(Debug, Default)]
pub struct DragGesture {
    state: Option<Inner>,
}

#[derive(Debug)]
struct Inner {
    source: usize,
    source_id: NoteId,
    /// Ids of the dragged note's descendants. Hover and drop on these are
    /// ignored to uphold the no-cycle invariant before the mutator runs.
    excluded: HashSet<NoteId>,
    hover: Option<(usize, DropZone)>,
}

impl DragGesture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a drag on the note at `source`. `descendants` are the ids of
    /// the dragged note's subtree; they become invalid targets. Starting a
    /// new gesture replaces any active one.
    pub fn begin(&mut self, source: usize, source_id: NoteId, descendants: HashSet<NoteId>) {
        trace!(source, source_id, "drag begin");
        self.state = Some(Inner {
            source,
            source_id,
            excluded: descendants,
            hover: None,
        });
    }

    /// The pointer entered a note's drop-affordance region. Invalid targets
    /// (the source itself, anything in its subtree) clear the hover instead.
    pub fn hover(&mut self, target: usize, target_id: NoteId, zone: DropZone) {
        let Some(inner) = self.state.as_mut() else {
            return;
        };
        if target == inner.source || target_id == inner.source_id || inner.excluded.contains(&target_id)
        {
            inner.hover = None;
            return;
        }
        inner.hover = Some((target, zone));
    }

    /// The pointer left the hovered note without dropping.
    pub fn leave(&mut self) {
        if let Some(inner) = self.state.as_mut() {
            inner.hover = None;
        }
    }

    /// The drop happened. Returns the gesture's intent, if any, and returns
    /// to idle either way.
    pub fn release(&mut self) -> Option<DropIntent> {
        let inner = self.state.take()?;
        let (target, zone) = inner.hover?;
        let intent = match zone {
            DropZone::Parent => DropIntent::Reparent {
                source: inner.source,
                target,
            },
            DropZone::PinAbove => DropIntent::Pin {
                source: inner.source,
                position: target,
            },
            DropZone::PinBelow => DropIntent::Pin {
                source: inner.source,
                position: target + 1,
            },
        };
        trace!(?intent, "drag released");
        Some(intent)
    }

    /// The gesture was cancelled (Escape, drop outside any target).
    pub fn cancel(&mut self) {
        self.state = None;
    }

    /// Current state, for display affordances.
    pub fn state(&self) -> DragState {
        match &self.state {
            None => DragState::Idle,
            Some(inner) => match inner.hover {
                None => DragState::Dragging {
                    source: inner.source,
                },
                Some((target, zone)) => DragState::Hovering {
                    source: inner.source,
                    target,
                    zone,
                },
            },
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }
}
