//! Authoritative note collection.
//!
//! Conflict policy is last-write-wins at whole-field granularity: an update
//! replaces every field it carries, even if the sender computed it from a
//! stale copy. Concurrent edits to the same note are not merged.

use tracing::debug;

use crate::models::{Comment, Note, NoteDraft, NotePatch};

/// In-memory store of every live note, kept in creation order.
#[derive(Debug, Default)]
pub struct BoardStore {
    notes: Vec<Note>,
}

impl BoardStore {
    /// Create an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clone of every live note, in creation order.
    pub fn snapshot(&self) -> Vec<Note> {
        self.notes.clone()
    }

    /// Borrow every live note, in creation order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Look up a note by id.
    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Note> {
        self.notes.iter_mut().find(|n| n.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Create a note from client-supplied fields and return it.
    pub fn create(&mut self, draft: NoteDraft, author: &str) -> Note {
        let id = self.fresh_id();
        let note = Note::new(id, draft, author);
        debug!(note_id = %note.id, author, "note created");
        self.notes.push(note.clone());
        note
    }

    /// Merge a patch over an existing note.
    ///
    /// Returns the merged note, or `None` when the id is unknown. `timestamp`
    /// and `comments` are never touched by this path.
    pub fn update(&mut self, patch: &NotePatch, actor: &str) -> Option<Note> {
        let note = self.get_mut(&patch.id)?;
        note.apply_patch(patch);
        note.updated_by = actor.to_string();
        Some(note.clone())
    }

    /// Remove a note. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        self.notes.len() != before
    }

    /// Append a comment to a note. Returns `None` when the note is unknown.
    pub fn add_comment(&mut self, note_id: &str, author: &str, text: String) -> Option<Comment> {
        let note = self.get_mut(note_id)?;
        let comment = Comment::new(author, text);
        note.comments.push(comment.clone());
        Some(comment)
    }

    /// Set a note's stacking order. Returns the updated note.
    pub fn set_z_index(&mut self, id: &str, z_index: u64) -> Option<Note> {
        let note = self.get_mut(id)?;
        note.z_index = z_index;
        Some(note.clone())
    }

    /// Set or clear a note's lock holder. Returns the updated note.
    pub fn set_editing(&mut self, id: &str, owner: Option<String>) -> Option<Note> {
        let note = self.get_mut(id)?;
        note.editing = owner;
        Some(note.clone())
    }

    /// Highest stacking order on the board, or 0 when empty.
    pub fn max_z_index(&self) -> u64 {
        self.notes.iter().map(|n| n.z_index).max().unwrap_or(0)
    }

    /// Ids of every note whose lock is held by `name`.
    pub fn locked_by(&self, name: &str) -> Vec<String> {
        self.notes
            .iter()
            .filter(|n| n.is_locked_by(name))
            .map(|n| n.id.clone())
            .collect()
    }

    // UUID collisions are not expected; the loop keeps ids unique regardless.
    fn fresh_id(&self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().to_string();
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn draft(title: &str) -> NoteDraft {
        NoteDraft {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_then_snapshot_has_defaults() {
        let mut store = BoardStore::new();
        let note = store.create(draft("x"), "alice");

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        let stored = &snapshot[0];
        assert_eq!(stored.id, note.id);
        assert_eq!(stored.title, "x");
        assert_eq!(stored.width, 256.0);
        assert_eq!(stored.height, 256.0);
        assert_eq!(stored.z_index, 1);
        assert!(stored.editing.is_none());
        assert!(stored.comments.is_empty());
        assert_eq!(stored.updated_by, "alice");
    }

    #[test]
    fn test_snapshot_preserves_creation_order() {
        let mut store = BoardStore::new();
        let a = store.create(draft("a"), "alice");
        let b = store.create(draft("b"), "alice");
        let c = store.create(draft("c"), "alice");
        let ids: Vec<_> = store.notes().iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_ids_stay_unique_across_mutations() {
        let mut store = BoardStore::new();
        let mut created = Vec::new();
        for i in 0..50 {
            let note = store.create(draft(&format!("n{i}")), "alice");
            if i % 3 == 0 {
                store.delete(&note.id);
            } else {
                store.update(
                    &NotePatch {
                        x: Some(i as f64),
                        ..NotePatch::new(note.id.clone())
                    },
                    "bob",
                );
            }
            created.push(note.id);
        }
        let live: HashSet<_> = store.notes().iter().map(|n| n.id.clone()).collect();
        assert_eq!(live.len(), store.len());
        let all: HashSet<_> = created.iter().collect();
        assert_eq!(all.len(), created.len());
    }

    #[test]
    fn test_update_merges_and_sets_author() {
        let mut store = BoardStore::new();
        let note = store.create(draft("x"), "alice");
        store.add_comment(&note.id, "alice", "first".to_string());

        let patch = NotePatch {
            content: Some("body".to_string()),
            x: Some(40.0),
            ..NotePatch::new(note.id.clone())
        };
        let merged = store.update(&patch, "bob").unwrap();
        assert_eq!(merged.title, "x");
        assert_eq!(merged.content, "body");
        assert_eq!(merged.x, 40.0);
        assert_eq!(merged.updated_by, "bob");
        assert_eq!(merged.timestamp, note.timestamp);
        assert_eq!(merged.comments.len(), 1);
        assert_eq!(store.get(&note.id).unwrap(), &merged);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = BoardStore::new();
        store.create(draft("x"), "alice");
        assert!(store.update(&NotePatch::new("missing"), "bob").is_none());
        assert_eq!(store.notes()[0].updated_by, "alice");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = BoardStore::new();
        let note = store.create(draft("x"), "alice");
        assert!(store.delete(&note.id));
        assert!(!store.delete(&note.id));
        assert!(!store.delete("never-existed"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_comments_append_in_order() {
        let mut store = BoardStore::new();
        let note = store.create(draft("x"), "alice");
        let first = store
            .add_comment(&note.id, "alice", "one".to_string())
            .unwrap();
        let second = store
            .add_comment(&note.id, "bob", "two".to_string())
            .unwrap();
        assert_ne!(first.id, second.id);

        let comments = &store.get(&note.id).unwrap().comments;
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].text, "one");
        assert_eq!(comments[1].user, "bob");
    }

    #[test]
    fn test_comment_on_unknown_note_is_noop() {
        let mut store = BoardStore::new();
        let comment = store.add_comment("missing", "alice", "hi".to_string());
        assert!(comment.is_none());
    }

    #[test]
    fn test_narrow_mutators() {
        let mut store = BoardStore::new();
        let note = store.create(draft("x"), "alice");
        assert_eq!(store.set_z_index(&note.id, 7).unwrap().z_index, 7);
        assert_eq!(
            store
                .set_editing(&note.id, Some("bob".to_string()))
                .unwrap()
                .editing
                .as_deref(),
            Some("bob")
        );
        assert_eq!(store.locked_by("bob"), vec![note.id.clone()]);
        assert!(store.set_editing(&note.id, None).unwrap().editing.is_none());
        assert!(store.set_z_index("missing", 3).is_none());
    }

    #[test]
    fn test_max_z_index() {
        let mut store = BoardStore::new();
        assert_eq!(store.max_z_index(), 0);
        let a = store.create(draft("a"), "alice");
        store.create(draft("b"), "alice");
        assert_eq!(store.max_z_index(), 1);
        store.set_z_index(&a.id, 5);
        assert_eq!(store.max_z_index(), 5);
        store.delete(&a.id);
        assert_eq!(store.max_z_index(), 1);
    }
}
