//! Core data models for the notarium client.
//!
//! These types are shared across the notarium crates and mirror the wire
//! format of the note service REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backend-assigned note identifier.
pub type NoteId = i64;

/// Backend-assigned neural file identifier.
pub type FileId = i64;

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A user-authored text unit, optionally nested under a parent note or
/// scoped to a neural file.
///
/// A note belongs to at most one scope: a quick note (`parent_id` and
/// `file_id` both unset), a top-level file note (`file_id` set), or a child
/// note (`parent_id` set, `file_id` inherited and not authoritative on the
/// child record). `parent_id` must never create a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Long-form body, carried through delete-undo snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default = "default_note_type")]
    pub note_type: String,
    pub parent_id: Option<NoteId>,
    pub file_id: Option<FileId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_pinned: bool,
    /// Zero-based position within the pinned set. Meaningful only while
    /// `is_pinned` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin_position: Option<i32>,
    /// Backend-formatted "HH:MM DD/MM/YYYY" deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

fn default_note_type() -> String {
    crate::defaults::NOTE_TYPE_TEXT.to_string()
}

/// Children summary for a note, as reported by the children-count endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildrenStatus {
    pub has_children: bool,
    pub children_count: i64,
}

// =============================================================================
// FILE TYPES
// =============================================================================

/// A named container of top-level notes with its own display preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeuralFile {
    pub id: FileId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// `None` means the preference was never set. The sentinel must survive
    /// loading so callers never sort with a guessed order before the stored
    /// preference arrives.
    #[serde(default)]
    pub note_order: Option<OrderMode>,
    #[serde(default)]
    pub table_of_contents_mode: bool,
    /// Cached AI-derived topic labels.
    #[serde(default)]
    pub pillars: Vec<String>,
}

/// Per-file chronological display preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderMode {
    /// Newest notes first (descending created_at).
    LatestFirst,
    /// Oldest notes first (ascending created_at). The default for files
    /// without a stored preference.
    LatestLast,
}

impl OrderMode {
    /// Resolve a stored preference to a concrete mode.
    pub fn resolve(stored: Option<OrderMode>) -> OrderMode {
        stored.unwrap_or(OrderMode::LatestLast)
    }
}

impl std::fmt::Display for OrderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderMode::LatestFirst => write!(f, "latest-first"),
            OrderMode::LatestLast => write!(f, "latest-last"),
        }
    }
}

// =============================================================================
// SCOPE TYPES
// =============================================================================

/// The set of notes a list view displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Global/today view, fed by the recent-notes endpoint.
    Recent,
    /// Top-level notes of a neural file.
    File(FileId),
    /// Children of a parent note.
    Children(NoteId),
}

impl Scope {
    /// Pin context sent to the backend for this scope.
    pub fn pin_context(&self) -> PinContext {
        match self {
            Scope::Children(_) => PinContext::Parent,
            Scope::Recent | Scope::File(_) => PinContext::File,
        }
    }

    /// Short label used in log fields.
    pub fn label(&self) -> &'static str {
        match self {
            Scope::Recent => "recent",
            Scope::File(_) => "file",
            Scope::Children(_) => "children",
        }
    }
}

/// Pin context accompanying a pin call: whether the pinned set lives among
/// a parent note's children or a file's top-level notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinContext {
    Parent,
    File,
}

// =============================================================================
// MUTATION TYPES
// =============================================================================

/// The reversible mutation currently on display, if any. At most one is
/// tracked at a time; recording a new one replaces the old.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingMutation {
    /// A single note was deleted. The snapshot carries everything needed to
    /// recreate it (recreation yields a new id).
    Delete { snapshot: Note },
    /// A note was moved under a new parent (or to the file top level).
    Reparent {
        note_id: NoteId,
        previous_parent_id: Option<NoteId>,
        new_parent_id: Option<NoteId>,
    },
    /// A note was pinned or unpinned.
    Pin { note_id: NoteId, action: PinAction },
}

/// Direction of a pin mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinAction {
    Pin,
    Unpin,
}

/// Observable phases of an optimistic mutation.
///
/// `Proposed` while the local change is applied but unconfirmed, `Confirmed`
/// once the backend accepted it, `Failed` after the backend rejected it and
/// the local change was rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Proposed,
    Confirmed,
    Failed,
}

// =============================================================================
// Tests
// =============================================================================
