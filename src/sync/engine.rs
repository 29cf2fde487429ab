//! Synchronization engine.
//!
//! Owns the board store, the identity registry and the lock rules, and turns
//! each inbound intent into a list of [`Outbound`] events. It is driven by a
//! single task, one intent at a time, so the store needs no locking of its
//! own. Domain-rule violations (unknown note, contended lock, release by a
//! non-owner) are silent no-ops; only frames that fail validation produce a
//! `server:error`, and only for their sender.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::board::{BoardStore, ConnectionId, EditLockManager, IdentityRegistry};
use crate::models::{NoteDraft, NotePatch};
use crate::sync::protocol::{
    ClientMessage, CommentPayload, DeletePayload, EditingPayload, JoinPayload,
};
use crate::sync::router::{BroadcastRouter, Outbound, Outcome};

/// Author recorded for mutations from a connection that never joined.
pub const UNKNOWN_USER: &str = "unknown";

/// Point-in-time counters for health reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    /// Live notes on the board
    pub notes: usize,
    /// Connections that have joined with a display name
    pub users: usize,
}

/// The server-authoritative board.
#[derive(Debug, Default)]
pub struct SyncEngine {
    store: BoardStore,
    presence: IdentityRegistry,
    locks: EditLockManager,
    router: BroadcastRouter,
}

impl SyncEngine {
    /// Create an engine over an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn presence(&self) -> &IdentityRegistry {
        &self.presence
    }

    pub fn stats(&self) -> BoardStats {
        BoardStats {
            notes: self.store.len(),
            users: self.presence.len(),
        }
    }

    /// Validate and apply one raw text frame.
    ///
    /// A frame that does not match its event's schema leaves the board
    /// untouched and yields a single `server:error` for the sender.
    pub fn handle_frame(&mut self, conn: ConnectionId, text: &str) -> Vec<Outbound> {
        match ClientMessage::parse(text) {
            Ok(msg) => self.handle(conn, msg),
            Err(e) => {
                warn!(conn, error = %e, "rejected frame");
                vec![self.router.route(conn, Outcome::Failed(e.to_string()))]
            }
        }
    }

    /// Apply one validated intent.
    pub fn handle(&mut self, conn: ConnectionId, msg: ClientMessage) -> Vec<Outbound> {
        debug!(conn, event = msg.event_name(), "intent");
        let outcomes = match msg {
            ClientMessage::UserJoin(JoinPayload { name }) => self.join(conn, name),
            ClientMessage::BoardInit => vec![Outcome::Snapshot(self.store.snapshot())],
            ClientMessage::NoteCreate(draft) => self.create(conn, draft),
            ClientMessage::NoteUpdate(patch) => self.update(conn, &patch),
            ClientMessage::NoteDelete(DeletePayload { id }) => self.delete(conn, id),
            ClientMessage::NoteComment(CommentPayload { note_id, text }) => {
                self.comment(conn, note_id, text)
            }
            ClientMessage::NoteEditing(EditingPayload {
                note_id,
                is_editing,
            }) => self.editing(conn, &note_id, is_editing),
        };
        self.route_all(conn, outcomes)
    }

    /// Tear down a connection: release its identity's locks, then drop it
    /// from presence. Always completes; unknown connections only refresh
    /// presence.
    pub fn disconnect(&mut self, conn: ConnectionId) -> Vec<Outbound> {
        let mut outcomes = Vec::new();
        if let Some(name) = self.presence.remove(conn) {
            let released = self.locks.release_all(&mut self.store, &name);
            info!(conn, name = %name, released = released.len(), "user left");
            outcomes.extend(released.into_iter().map(Outcome::Updated));
        }
        outcomes.push(Outcome::Presence(self.presence.users()));
        self.route_all(conn, outcomes)
    }

    fn route_all(&self, conn: ConnectionId, outcomes: Vec<Outcome>) -> Vec<Outbound> {
        outcomes
            .into_iter()
            .map(|outcome| self.router.route(conn, outcome))
            .collect()
    }

    fn author(&self, conn: ConnectionId) -> String {
        self.presence
            .name(conn)
            .unwrap_or(UNKNOWN_USER)
            .to_string()
    }

    fn join(&mut self, conn: ConnectionId, name: String) -> Vec<Outcome> {
        info!(conn, name = %name, "user joined");
        self.presence.join(conn, name);
        vec![Outcome::Presence(self.presence.users())]
    }

    fn create(&mut self, conn: ConnectionId, draft: NoteDraft) -> Vec<Outcome> {
        let author = self.author(conn);
        let note = self.store.create(draft, &author);
        vec![Outcome::Created(note)]
    }

    fn update(&mut self, conn: ConnectionId, patch: &NotePatch) -> Vec<Outcome> {
        let author = self.author(conn);
        match self.store.update(patch, &author) {
            Some(note) => vec![Outcome::Updated(note)],
            None => {
                debug!(conn, note_id = %patch.id, "update for unknown note ignored");
                Vec::new()
            }
        }
    }

    fn delete(&mut self, conn: ConnectionId, id: String) -> Vec<Outcome> {
        if !self.store.delete(&id) {
            debug!(conn, note_id = %id, "delete for unknown note");
        }
        vec![Outcome::Deleted(id)]
    }

    fn comment(&mut self, conn: ConnectionId, note_id: String, text: String) -> Vec<Outcome> {
        let author = self.author(conn);
        match self.store.add_comment(&note_id, &author, text) {
            Some(comment) => vec![Outcome::Commented { note_id, comment }],
            None => {
                debug!(conn, note_id = %note_id, "comment for unknown note ignored");
                Vec::new()
            }
        }
    }

    fn editing(&mut self, conn: ConnectionId, note_id: &str, is_editing: bool) -> Vec<Outcome> {
        // Locks are keyed by display name; without one there is nothing to hold.
        let Some(who) = self.presence.name(conn).map(str::to_string) else {
            debug!(conn, note_id, "anonymous lock request ignored");
            return Vec::new();
        };
        let outcome = if is_editing {
            self.locks.acquire(&mut self.store, note_id, &who)
        } else {
            self.locks.release(&mut self.store, note_id, &who)
        };
        debug!(conn, note_id, who = %who, outcome = ?outcome, "lock request");
        match outcome.changed() {
            Some(note) => vec![Outcome::Updated(note)],
            None => Vec::new(),
        }
    }
}
