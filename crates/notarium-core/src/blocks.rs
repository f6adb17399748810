//! Block-editor state for file and note descriptions.
//!
//! Descriptions are edited as an ordered sequence of blocks. Each block is
//! keyed by a stable client-generated id, so per-block edit state stays
//! attached to the right block when neighbours are inserted or removed
//! mid-edit. Positional indexes are never used as keys.

use uuid::Uuid;

/// One editable description block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: Uuid,
    pub content: String,
    pub editing: bool,
}

impl Block {
    fn new(content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            editing: false,
        }
    }
}

/// An ordered sequence of description blocks.
///
/// At most one block is in the editing state at a time.
#[derive(Debug, Clone, Default)]
pub struct BlockList {
    blocks: Vec<Block>,
}

impl BlockList {
    /// Build a block list from plain content lines (the wire form).
    pub fn from_contents<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            blocks: contents.into_iter().map(|c| Block::new(c.into())).collect(),
        }
    }

    /// Build a block list from newline-joined text. Empty text yields an
    /// empty list, not a single empty block.
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Self::from_contents(text.lines().map(str::to_string))
    }

    /// The plain content lines, in order (the wire form).
    pub fn contents(&self) -> Vec<String> {
        self.blocks.iter().map(|b| b.content.clone()).collect()
    }

    /// Newline-joined text of all blocks.
    pub fn to_text(&self) -> String {
        self.contents().join("\n")
    }

    /// Append a block, returning its id.
    pub fn push(&mut self, content: impl Into<String>) -> Uuid {
        let block = Block::new(content.into());
        let id = block.id;
        self.blocks.push(block);
        id
    }

    /// Insert a block after the one with the given id. Returns the new id,
    /// or `None` if the anchor does not exist.
    pub fn insert_after(&mut self, anchor: Uuid, content: impl Into<String>) -> Option<Uuid> {
        let pos = self.position(anchor)?;
        let block = Block::new(content.into());
        let id = block.id;
        self.blocks.insert(pos + 1, block);
        Some(id)
    }

    /// Remove the block with the given id. Returns whether it existed.
    pub fn remove(&mut self, id: Uuid) -> bool {
        match self.position(id) {
            Some(pos) => {
                self.blocks.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Replace the content of the block with the given id.
    pub fn set_content(&mut self, id: Uuid, content: impl Into<String>) -> bool {
        match self.block_mut(id) {
            Some(block) => {
                block.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Mark the block with the given id as editing, ending any other edit.
    pub fn begin_edit(&mut self, id: Uuid) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        for block in &mut self.blocks {
            block.editing = block.id == id;
        }
        true
    }

    /// End the edit on the block with the given id.
    pub fn end_edit(&mut self, id: Uuid) -> bool {
        match self.block_mut(id) {
            Some(block) => {
                block.editing = false;
                true
            }
            None => false,
        }
    }

    /// The block currently being edited, if any.
    pub fn editing(&self) -> Option<&Block> {
        self.blocks.iter().find(|b| b.editing)
    }

    pub fn get(&self, id: Uuid) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == id)
    }

    fn block_mut(&mut self, id: Uuid) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| b.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_contents_roundtrip() {
        let list = BlockList::from_contents(["alpha", "beta"]);
        assert_eq!(list.contents(), vec!["alpha", "beta"]);
        assert_eq!(list.to_text(), "alpha\nbeta");
    }

    #[test]
    fn test_from_text_empty() {
        assert!(BlockList::from_text("").is_empty());
        assert_eq!(BlockList::from_text("one\ntwo").len(), 2);
    }

    #[test]
    fn test_edit_survives_insert_before_edited_block() {
        let mut list = BlockList::from_contents(["first", "second"]);
        let second = list.iter().nth(1).unwrap().id;
        let first = list.iter().next().unwrap().id;

        list.begin_edit(second);
        // Inserting a block above the edited one must not steal the edit.
        list.insert_after(first, "inserted");

        let editing = list.editing().unwrap();
        assert_eq!(editing.id, second);
        assert_eq!(editing.content, "second");
        assert_eq!(list.contents(), vec!["first", "inserted", "second"]);
    }

    #[test]
    fn test_edit_survives_removal_of_neighbour() {
        let mut list = BlockList::from_contents(["a", "b", "c"]);
        let a = list.iter().next().unwrap().id;
        let c = list.iter().nth(2).unwrap().id;

        list.begin_edit(c);
        list.remove(a);

        assert_eq!(list.editing().unwrap().content, "c");
    }

    #[test]
    fn test_single_editor_at_a_time() {
        let mut list = BlockList::from_contents(["a", "b"]);
        let a = list.iter().next().unwrap().id;
        let b = list.iter().nth(1).unwrap().id;

        list.begin_edit(a);
        list.begin_edit(b);

        assert_eq!(list.editing().unwrap().id, b);
    }

    #[test]
    fn test_set_content_and_end_edit() {
        let mut list = BlockList::from_contents(["draft"]);
        let id = list.iter().next().unwrap().id;

        list.begin_edit(id);
        assert!(list.set_content(id, "final"));
        assert!(list.end_edit(id));

        assert!(list.editing().is_none());
        assert_eq!(list.get(id).unwrap().content, "final");
    }

    #[test]
    fn test_unknown_id_operations_fail() {
        let mut list = BlockList::from_contents(["a"]);
        let stranger = Uuid::new_v4();
        assert!(!list.remove(stranger));
        assert!(!list.set_content(stranger, "x"));
        assert!(!list.begin_edit(stranger));
        assert!(list.insert_after(stranger, "x").is_none());
    }
}
