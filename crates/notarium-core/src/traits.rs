//! Repository traits for the note service backend.
//!
//! These traits define the REST surface the client consumes, enabling
//! pluggable backends: the HTTP implementation in notarium-client and the
//! in-memory mock used by tests.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// REQUEST TYPES
// =============================================================================

/// Request for creating a new note.
#[derive(Debug, Clone, Serialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub description: String,
    pub note_type: String,
    pub parent_id: Option<NoteId>,
    pub file_id: Option<FileId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl CreateNoteRequest {
    /// Minimal creation request for a new text note in the given scope.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            note_type: crate::defaults::NOTE_TYPE_TEXT.to_string(),
            parent_id: None,
            file_id: None,
            deadline: None,
            content: None,
            priority: None,
            display_order: None,
            tags: vec![],
        }
    }

    /// Build a recreation request from a delete-undo snapshot. The backend
    /// assigns a fresh id; everything else is restored.
    pub fn from_snapshot(snapshot: &Note) -> Self {
        Self {
            title: snapshot.title.clone(),
            description: snapshot.description.clone(),
            note_type: snapshot.note_type.clone(),
            parent_id: snapshot.parent_id,
            file_id: snapshot.file_id,
            deadline: snapshot.deadline.clone(),
            content: snapshot.content.clone(),
            priority: snapshot.priority,
            display_order: snapshot.display_order,
            tags: snapshot.tags.clone(),
        }
    }
}

/// Partial note update. Only fields that are `Some` are serialized, so a
/// reparent sends nothing but `parent_id`.
///
/// `parent_id` is doubly optional: `None` omits the field, `Some(None)`
/// explicitly moves the note to the file top level (`"parent_id": null`).
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<NoteId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl UpdateNoteRequest {
    /// Update that moves the note under `parent` (or to the top level).
    pub fn reparent(parent: Option<NoteId>) -> Self {
        Self {
            parent_id: Some(parent),
            ..Default::default()
        }
    }
}

/// Request for creating a neural file.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFileRequest {
    pub name: String,
    pub description: String,
}

/// Partial neural file update, used for renames and per-file preferences.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateFileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_order: Option<OrderMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_of_contents_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pillars: Option<Vec<String>>,
}

/// Context sent to the pillar generation endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PillarRequest {
    pub page_title: String,
    pub page_description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

// =============================================================================
// NOTE STORE
// =============================================================================

/// Backend store for note CRUD, hierarchy, and pin operations.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// List child notes of a parent note.
    async fn list_children(&self, parent_id: NoteId) -> Result<Vec<Note>>;

    /// List top-level notes of a neural file.
    async fn list_file_notes(&self, file_id: FileId) -> Result<Vec<Note>>;

    /// List notes for the global/today scope.
    async fn list_recent(&self) -> Result<Vec<Note>>;

    /// Fetch a single note by id.
    async fn fetch(&self, id: NoteId) -> Result<Note>;

    /// Children summary for a note.
    async fn children_count(&self, id: NoteId) -> Result<ChildrenStatus>;

    /// Create a note.
    async fn create(&self, req: CreateNoteRequest) -> Result<Note>;

    /// Partially update a note (reparent, deadline, completion).
    async fn update(&self, id: NoteId, req: UpdateNoteRequest) -> Result<Note>;

    /// Update a note's title.
    async fn update_title(&self, id: NoteId, title: &str) -> Result<()>;

    /// Update a note's description blocks.
    async fn update_description(&self, id: NoteId, blocks: &[String]) -> Result<()>;

    /// Delete a single note.
    async fn delete(&self, id: NoteId) -> Result<()>;

    /// Delete several notes atomically: either all listed notes are removed
    /// or the call fails and none are.
    async fn delete_many(&self, ids: &[NoteId]) -> Result<()>;

    /// Pin a note at a zero-based position within its scope's pinned set.
    async fn pin(&self, id: NoteId, position: i32, context: PinContext) -> Result<()>;

    /// Clear a note's pin.
    async fn unpin(&self, id: NoteId) -> Result<()>;

    /// List the notes of a scope. Dispatches to the matching endpoint.
    async fn list_scope(&self, scope: Scope) -> Result<Vec<Note>> {
        match scope {
            Scope::Recent => self.list_recent().await,
            Scope::File(file_id) => self.list_file_notes(file_id).await,
            Scope::Children(parent_id) => self.list_children(parent_id).await,
        }
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Backend store for neural files and their preferences.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// List all neural files (sidebar view).
    async fn list_files(&self) -> Result<Vec<NeuralFile>>;

    /// Fetch a neural file by id.
    async fn fetch_file(&self, id: FileId) -> Result<NeuralFile>;

    /// Create a neural file.
    async fn create_file(&self, req: CreateFileRequest) -> Result<NeuralFile>;

    /// Partially update a neural file (rename, preferences, pillar cache).
    async fn update_file(&self, id: FileId, req: UpdateFileRequest) -> Result<NeuralFile>;

    /// Delete a neural file. Cascade removal of its notes is the backend's
    /// concern.
    async fn delete_file(&self, id: FileId) -> Result<()>;

    /// Ask the AI subsystem for topic pillars. Slow; uses the long timeout.
    async fn generate_pillars(&self, req: PillarRequest) -> Result<Vec<String>>;
}

// =============================================================================
// Tests
// =============================================================================
