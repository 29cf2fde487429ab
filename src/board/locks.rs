//! Advisory per-note edit locks.
//!
//! A note is either unlocked or locked by a display name. The lock is a
//! cooperative marker between identities, not a concurrency primitive: it is
//! not enforced against `note:update`, and contention is resolved silently
//! (first acquirer wins, no queue, no denial message).
//!
//! Lock state lives in [`Note::editing`]; the manager holds no state of its own.

use tracing::debug;

use crate::board::{BoardStore, ZOrderAllocator};
use crate::models::Note;

/// Result of a lock request.
#[derive(Debug, Clone, PartialEq)]
pub enum LockOutcome {
    /// The caller now holds the lock; the note was also raised to the front.
    Acquired(Note),
    /// The caller's lock was released.
    Released(Note),
    /// Someone else holds the lock; nothing changed.
    Contended { holder: String },
    /// Release requested by an identity that does not hold the lock.
    NotOwner,
    /// The note does not exist.
    NotFound,
}

impl LockOutcome {
    /// The updated note, if the request changed state.
    pub fn changed(self) -> Option<Note> {
        match self {
            LockOutcome::Acquired(note) | LockOutcome::Released(note) => Some(note),
            _ => None,
        }
    }
}

/// Applies the acquire / release / forced-release rules.
#[derive(Debug, Default, Clone, Copy)]
pub struct EditLockManager {
    zorder: ZOrderAllocator,
}

impl EditLockManager {
    pub fn new(zorder: ZOrderAllocator) -> Self {
        Self { zorder }
    }

    /// Take the lock on `note_id` for `who`.
    ///
    /// Succeeds when the note is unlocked or already held by `who`; on success
    /// the note is also brought to the front.
    pub fn acquire(&self, store: &mut BoardStore, note_id: &str, who: &str) -> LockOutcome {
        let Some(note) = store.get(note_id) else {
            return LockOutcome::NotFound;
        };
        if let Some(holder) = note.editing.as_deref() {
            if holder != who {
                debug!(note_id, who, holder, "lock contended");
                return LockOutcome::Contended {
                    holder: holder.to_string(),
                };
            }
        }

        self.zorder.bring_to_front(store, note_id);
        match store.set_editing(note_id, Some(who.to_string())) {
            Some(note) => LockOutcome::Acquired(note),
            None => LockOutcome::NotFound,
        }
    }

    /// Give up the lock on `note_id`. Only the holder may release.
    pub fn release(&self, store: &mut BoardStore, note_id: &str, who: &str) -> LockOutcome {
        let Some(note) = store.get(note_id) else {
            return LockOutcome::NotFound;
        };
        if !note.is_locked_by(who) {
            return LockOutcome::NotOwner;
        }
        match store.set_editing(note_id, None) {
            Some(note) => LockOutcome::Released(note),
            None => LockOutcome::NotFound,
        }
    }

    /// Unconditionally release every lock held by `who`.
    ///
    /// Returns the notes that were unlocked, in board order.
    pub fn release_all(&self, store: &mut BoardStore, who: &str) -> Vec<Note> {
        store
            .locked_by(who)
            .into_iter()
            .filter_map(|id| store.set_editing(&id, None))
            .collect()
    }
}
