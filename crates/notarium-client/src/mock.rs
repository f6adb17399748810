//! Deterministic in-memory backend for tests.
//!
//! Implements both stores against a seeded note/file set, keeps pin
//! positions the way the real backend does (so reload-after-pin is
//! meaningful), logs every call for assertions, and supports per-operation
//! failure injection.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use notarium_core::{
    ChildrenStatus, CreateFileRequest, CreateNoteRequest, Error, FileId, FileStore, NeuralFile,
    Note, NoteId, NoteStore, PillarRequest, PinContext, Result, Scope, UpdateFileRequest,
    UpdateNoteRequest,
};

/// One recorded backend call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub operation: String,
    pub detail: String,
}

#[derive(Default)]
struct State {
    notes: Vec<Note>,
    files: HashMap<FileId, NeuralFile>,
    next_note_id: NoteId,
    next_file_id: FileId,
    calls: Vec<MockCall>,
    failing_ops: HashSet<String>,
    canned_pillars: Vec<String>,
}

/// In-memory note service double.
#[derive(Clone)]
pub struct MockBackend {
    inner: Arc<Mutex<State>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                next_note_id: 1,
                next_file_id: 1,
                ..Default::default()
            })),
        }
    }

    /// Seed a note and return its id.
    pub fn seed_note(
        &self,
        title: &str,
        parent_id: Option<NoteId>,
        file_id: Option<FileId>,
        created_at: DateTime<Utc>,
    ) -> NoteId {
        let mut state = self.inner.lock().unwrap();
        let id = state.next_note_id;
        state.next_note_id += 1;
        state.notes.push(Note {
            id,
            title: title.to_string(),
            description: String::new(),
            content: None,
            note_type: "text".to_string(),
            parent_id,
            file_id,
            created_at,
            is_pinned: false,
            pin_position: None,
            deadline: None,
            completed: false,
            priority: None,
            display_order: None,
            tags: vec![],
        });
        id
    }

    /// Seed a neural file and return its id.
    pub fn seed_file(&self, name: &str) -> FileId {
        let mut state = self.inner.lock().unwrap();
        let id = state.next_file_id;
        state.next_file_id += 1;
        state.files.insert(
            id,
            NeuralFile {
                id,
                name: name.to_string(),
                description: String::new(),
                note_order: None,
                table_of_contents_mode: false,
                pillars: vec![],
            },
        );
        id
    }

    /// Make the named operation fail with a simulated network error.
    pub fn fail_on(&self, operation: &str) {
        self.inner.lock().unwrap().failing_ops.insert(operation.to_string());
    }

    /// Let the named operation succeed again.
    pub fn recover(&self, operation: &str) {
        self.inner.lock().unwrap().failing_ops.remove(operation);
    }

    /// Fix the pillar generation response.
    pub fn set_pillars(&self, pillars: Vec<String>) {
        self.inner.lock().unwrap().canned_pillars = pillars;
    }

    /// All recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// How many times the named operation was invoked.
    pub fn call_count(&self, operation: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    /// Current state of a note, if it exists.
    pub fn note(&self, id: NoteId) -> Option<Note> {
        self.inner.lock().unwrap().notes.iter().find(|n| n.id == id).cloned()
    }

    /// Current state of a file, if it exists.
    pub fn file(&self, id: FileId) -> Option<NeuralFile> {
        self.inner.lock().unwrap().files.get(&id).cloned()
    }

    /// Notes a scope list call would return right now.
    pub fn scope_notes(&self, scope: Scope) -> Vec<Note> {
        let state = self.inner.lock().unwrap();
        Self::list_in(&state, scope)
    }

    fn guard(state: &mut State, operation: &str, detail: String) -> Result<()> {
        state.calls.push(MockCall {
            operation: operation.to_string(),
            detail,
        });
        if state.failing_ops.contains(operation) {
            return Err(Error::Request(format!(
                "simulated network failure: {}",
                operation
            )));
        }
        Ok(())
    }

    fn in_scope(note: &Note, scope: Scope) -> bool {
        match scope {
            Scope::Children(parent_id) => note.parent_id == Some(parent_id),
            Scope::File(file_id) => note.parent_id.is_none() && note.file_id == Some(file_id),
            Scope::Recent => note.parent_id.is_none() && note.file_id.is_none(),
        }
    }

    /// Backend-reported order: the pinned set by pin position, then the
    /// rest by creation time.
    fn list_in(state: &State, scope: Scope) -> Vec<Note> {
        let mut pinned: Vec<Note> = state
            .notes
            .iter()
            .filter(|n| Self::in_scope(n, scope) && n.is_pinned)
            .cloned()
            .collect();
        pinned.sort_by_key(|n| n.pin_position.unwrap_or(i32::MAX));

        let mut rest: Vec<Note> = state
            .notes
            .iter()
            .filter(|n| Self::in_scope(n, scope) && !n.is_pinned)
            .cloned()
            .collect();
        rest.sort_by_key(|n| n.created_at);

        pinned.extend(rest);
        pinned
    }

    fn scope_of(note: &Note) -> Scope {
        if let Some(parent_id) = note.parent_id {
            Scope::Children(parent_id)
        } else if let Some(file_id) = note.file_id {
            Scope::File(file_id)
        } else {
            Scope::Recent
        }
    }

    fn renumber_pins(state: &mut State, scope: Scope) {
        let mut pinned_ids: Vec<(i32, NoteId)> = state
            .notes
            .iter()
            .filter(|n| Self::in_scope(n, scope) && n.is_pinned)
            .map(|n| (n.pin_position.unwrap_or(i32::MAX), n.id))
            .collect();
        pinned_ids.sort();
        for (index, (_, id)) in pinned_ids.into_iter().enumerate() {
            if let Some(note) = state.notes.iter_mut().find(|n| n.id == id) {
                note.pin_position = Some(index as i32);
            }
        }
    }
}

#[async_trait]
impl NoteStore for MockBackend {
    async fn list_children(&self, parent_id: NoteId) -> Result<Vec<Note>> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "list_children", parent_id.to_string())?;
        Ok(Self::list_in(&state, Scope::Children(parent_id)))
    }

    async fn list_file_notes(&self, file_id: FileId) -> Result<Vec<Note>> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "list_file_notes", file_id.to_string())?;
        Ok(Self::list_in(&state, Scope::File(file_id)))
    }

    async fn list_recent(&self) -> Result<Vec<Note>> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "list_recent", String::new())?;
        Ok(Self::list_in(&state, Scope::Recent))
    }

    async fn fetch(&self, id: NoteId) -> Result<Note> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "fetch", id.to_string())?;
        state
            .notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or(Error::NoteNotFound(id))
    }

    async fn children_count(&self, id: NoteId) -> Result<ChildrenStatus> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "children_count", id.to_string())?;
        let count = state.notes.iter().filter(|n| n.parent_id == Some(id)).count() as i64;
        Ok(ChildrenStatus {
            has_children: count > 0,
            children_count: count,
        })
    }

    async fn create(&self, req: CreateNoteRequest) -> Result<Note> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "create", req.title.clone())?;
        let id = state.next_note_id;
        state.next_note_id += 1;
        let note = Note {
            id,
            title: req.title,
            description: req.description,
            content: req.content,
            note_type: req.note_type,
            parent_id: req.parent_id,
            file_id: req.file_id,
            created_at: Utc::now(),
            is_pinned: false,
            pin_position: None,
            deadline: req.deadline,
            completed: false,
            priority: req.priority,
            display_order: req.display_order,
            tags: req.tags,
        };
        state.notes.push(note.clone());
        Ok(note)
    }

    async fn update(&self, id: NoteId, req: UpdateNoteRequest) -> Result<Note> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "update", id.to_string())?;
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(Error::NoteNotFound(id))?;
        if let Some(parent_id) = req.parent_id {
            note.parent_id = parent_id;
        }
        if let Some(deadline) = req.deadline {
            note.deadline = Some(deadline);
        }
        if let Some(completed) = req.completed {
            note.completed = completed;
        }
        if let Some(priority) = req.priority {
            note.priority = Some(priority);
        }
        Ok(note.clone())
    }

    async fn update_title(&self, id: NoteId, title: &str) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "update_title", id.to_string())?;
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(Error::NoteNotFound(id))?;
        note.title = title.to_string();
        Ok(())
    }

    async fn update_description(&self, id: NoteId, blocks: &[String]) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "update_description", id.to_string())?;
        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(Error::NoteNotFound(id))?;
        note.description = blocks.join("\n");
        Ok(())
    }

    async fn delete(&self, id: NoteId) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "delete", id.to_string())?;
        let before = state.notes.len();
        state.notes.retain(|n| n.id != id);
        if state.notes.len() == before {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }

    async fn delete_many(&self, ids: &[NoteId]) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "delete_many", format!("{:?}", ids))?;
        // All-or-nothing: verify every id before touching anything.
        for id in ids {
            if !state.notes.iter().any(|n| n.id == *id) {
                return Err(Error::NoteNotFound(*id));
            }
        }
        state.notes.retain(|n| !ids.contains(&n.id));
        Ok(())
    }

    async fn pin(&self, id: NoteId, position: i32, _context: PinContext) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "pin", format!("{}@{}", id, position))?;
        let note = state
            .notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .ok_or(Error::NoteNotFound(id))?;
        let scope = Self::scope_of(&note);

        let mut pinned_ids: Vec<NoteId> = Self::list_in(&state, scope)
            .into_iter()
            .filter(|n| n.is_pinned && n.id != id)
            .map(|n| n.id)
            .collect();
        let slot = (position.max(0) as usize).min(pinned_ids.len());
        pinned_ids.insert(slot, id);

        for (index, pinned_id) in pinned_ids.iter().enumerate() {
            if let Some(n) = state.notes.iter_mut().find(|n| n.id == *pinned_id) {
                n.is_pinned = true;
                n.pin_position = Some(index as i32);
            }
        }
        Ok(())
    }

    async fn unpin(&self, id: NoteId) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "unpin", id.to_string())?;
        let scope = {
            let note = state
                .notes
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or(Error::NoteNotFound(id))?;
            note.is_pinned = false;
            note.pin_position = None;
            Self::scope_of(note)
        };
        Self::renumber_pins(&mut state, scope);
        Ok(())
    }
}

#[async_trait]
impl FileStore for MockBackend {
    async fn list_files(&self) -> Result<Vec<NeuralFile>> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "list_files", String::new())?;
        let mut files: Vec<NeuralFile> = state.files.values().cloned().collect();
        files.sort_by_key(|f| f.id);
        Ok(files)
    }

    async fn fetch_file(&self, id: FileId) -> Result<NeuralFile> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "fetch_file", id.to_string())?;
        state.files.get(&id).cloned().ok_or(Error::FileNotFound(id))
    }

    async fn create_file(&self, req: CreateFileRequest) -> Result<NeuralFile> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "create_file", req.name.clone())?;
        let id = state.next_file_id;
        state.next_file_id += 1;
        let file = NeuralFile {
            id,
            name: req.name,
            description: req.description,
            note_order: None,
            table_of_contents_mode: false,
            pillars: vec![],
        };
        state.files.insert(id, file.clone());
        Ok(file)
    }

    async fn update_file(&self, id: FileId, req: UpdateFileRequest) -> Result<NeuralFile> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "update_file", id.to_string())?;
        let file = state.files.get_mut(&id).ok_or(Error::FileNotFound(id))?;
        if let Some(name) = req.name {
            file.name = name;
        }
        if let Some(description) = req.description {
            file.description = description;
        }
        if let Some(note_order) = req.note_order {
            file.note_order = Some(note_order);
        }
        if let Some(toc) = req.table_of_contents_mode {
            file.table_of_contents_mode = toc;
        }
        if let Some(pillars) = req.pillars {
            file.pillars = pillars;
        }
        Ok(file.clone())
    }

    async fn delete_file(&self, id: FileId) -> Result<()> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "delete_file", id.to_string())?;
        state.files.remove(&id).ok_or(Error::FileNotFound(id))?;
        // Cascade as the real backend does.
        state.notes.retain(|n| n.file_id != Some(id));
        Ok(())
    }

    async fn generate_pillars(&self, req: PillarRequest) -> Result<Vec<String>> {
        let mut state = self.inner.lock().unwrap();
        Self::guard(&mut state, "generate_pillars", req.page_title.clone())?;
        Ok(state.canned_pillars.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 20, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_scope_listing() {
        let mock = MockBackend::new();
        let file = mock.seed_file("Physics");
        let top = mock.seed_note("top", None, Some(file), ts(9));
        let _child = mock.seed_note("child", Some(top), None, ts(10));
        let _quick = mock.seed_note("quick", None, None, ts(11));

        assert_eq!(mock.list_file_notes(file).await.unwrap().len(), 1);
        assert_eq!(mock.list_children(top).await.unwrap().len(), 1);
        assert_eq!(mock.list_recent().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pin_orders_pinned_set_first() {
        let mock = MockBackend::new();
        let file = mock.seed_file("f");
        let a = mock.seed_note("a", None, Some(file), ts(9));
        let b = mock.seed_note("b", None, Some(file), ts(10));
        let c = mock.seed_note("c", None, Some(file), ts(11));

        mock.pin(c, 0, PinContext::File).await.unwrap();
        mock.pin(a, 0, PinContext::File).await.unwrap();

        let listed = mock.list_file_notes(file).await.unwrap();
        let ids: Vec<NoteId> = listed.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, c, b]);
        assert_eq!(listed[0].pin_position, Some(0));
        assert_eq!(listed[1].pin_position, Some(1));
    }

    #[tokio::test]
    async fn test_unpin_renumbers() {
        let mock = MockBackend::new();
        let file = mock.seed_file("f");
        let a = mock.seed_note("a", None, Some(file), ts(9));
        let b = mock.seed_note("b", None, Some(file), ts(10));

        mock.pin(a, 0, PinContext::File).await.unwrap();
        mock.pin(b, 1, PinContext::File).await.unwrap();
        mock.unpin(a).await.unwrap();

        assert_eq!(mock.note(b).unwrap().pin_position, Some(0));
        assert!(!mock.note(a).unwrap().is_pinned);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let mock = MockBackend::new();
        mock.fail_on("list_recent");
        assert!(mock.list_recent().await.is_err());
        mock.recover("list_recent");
        assert!(mock.list_recent().await.is_ok());
        assert_eq!(mock.call_count("list_recent"), 2);
    }

    #[tokio::test]
    async fn test_delete_many_is_atomic_on_unknown_id() {
        let mock = MockBackend::new();
        let a = mock.seed_note("a", None, None, ts(9));
        let err = mock.delete_many(&[a, 999]).await.unwrap_err();
        assert!(matches!(err, Error::NoteNotFound(999)));
        assert!(mock.note(a).is_some());
    }
}
