//! Stacking-order allocator.
//!
//! The front of the stack is derived from live notes on every call rather
//! than from a cached counter, so deleting the topmost notes lets the next
//! raise reuse lower values. Values still grow without bound over a long
//! session; they are never compacted.

use crate::board::BoardStore;
use crate::models::Note;

/// Issues stacking-order values so "bring to front" is well defined.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZOrderAllocator;

impl ZOrderAllocator {
    pub fn new() -> Self {
        Self
    }

    /// Next value strictly above every live note.
    pub fn next_z_index(&self, store: &BoardStore) -> u64 {
        store.max_z_index() + 1
    }

    /// Raise a note above every other live note.
    ///
    /// Returns the updated note, or `None` if the id is unknown.
    pub fn bring_to_front(&self, store: &mut BoardStore, id: &str) -> Option<Note> {
        if !store.contains(id) {
            return None;
        }
        let z_index = self.next_z_index(store);
        store.set_z_index(id, z_index)
    }
}
