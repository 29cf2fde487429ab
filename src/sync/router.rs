//! Broadcast routing: who receives each outcome.
//!
//! Snapshots and errors go back to the originating connection only. Every
//! state change and every presence update fans out to all connections,
//! originator included; clients apply their own echo like any other event.
//! Delivery is best effort with no acknowledgment or replay.

use crate::board::ConnectionId;
use crate::models::{Comment, Note, User};
use crate::sync::protocol::ServerMessage;

/// Delivery scope for one outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Only the connection that sent the request.
    Origin(ConnectionId),
    /// Every live connection.
    All,
}

/// An event paired with its audience.
#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub delivery: Delivery,
    pub message: ServerMessage,
}

impl Outbound {
    /// Whether `conn` should receive this event.
    pub fn reaches(&self, conn: ConnectionId) -> bool {
        match self.delivery {
            Delivery::Origin(origin) => origin == conn,
            Delivery::All => true,
        }
    }
}

/// Result of an engine operation that needs to be announced.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Snapshot(Vec<Note>),
    Presence(Vec<User>),
    Created(Note),
    Updated(Note),
    Deleted(String),
    Commented { note_id: String, comment: Comment },
    Failed(String),
}

impl Outcome {
    /// Snapshots and errors answer the requester alone.
    fn is_reply(&self) -> bool {
        matches!(self, Outcome::Snapshot(_) | Outcome::Failed(_))
    }
}

/// Maps outcomes to outbound events and their delivery scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct BroadcastRouter;

impl BroadcastRouter {
    pub fn new() -> Self {
        Self
    }

    /// Build the outbound event for an outcome triggered by `origin`.
    pub fn route(&self, origin: ConnectionId, outcome: Outcome) -> Outbound {
        let delivery = if outcome.is_reply() {
            Delivery::Origin(origin)
        } else {
            Delivery::All
        };
        let message = match outcome {
            Outcome::Snapshot(notes) => ServerMessage::BoardData { notes },
            Outcome::Presence(users) => ServerMessage::PresenceUsers { users },
            Outcome::Created(note) => ServerMessage::NoteCreated(note),
            Outcome::Updated(note) => ServerMessage::NoteUpdated(note),
            Outcome::Deleted(id) => ServerMessage::NoteDeleted { id },
            Outcome::Commented { note_id, comment } => {
                ServerMessage::NoteCommented { note_id, comment }
            }
            Outcome::Failed(message) => ServerMessage::ServerError { message },
        };
        Outbound { delivery, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteDraft;

    fn note() -> Note {
        Note::new("n-1".to_string(), NoteDraft::default(), "alice")
    }

    #[test]
    fn test_snapshot_goes_to_origin_only() {
        let out = BroadcastRouter::new().route(7, Outcome::Snapshot(vec![note()]));
        assert_eq!(out.delivery, Delivery::Origin(7));
        assert_eq!(out.message.event_name(), "board:data");
        assert!(out.reaches(7));
        assert!(!out.reaches(8));
    }

    #[test]
    fn test_error_goes_to_origin_only() {
        let out = BroadcastRouter::new().route(3, Outcome::Failed("nope".to_string()));
        assert_eq!(out.delivery, Delivery::Origin(3));
        assert_eq!(
            out.message,
            ServerMessage::ServerError {
                message: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_state_changes_fan_out_including_origin() {
        let router = BroadcastRouter::new();
        let outcomes = vec![
            Outcome::Presence(Vec::new()),
            Outcome::Created(note()),
            Outcome::Updated(note()),
            Outcome::Deleted("n-1".to_string()),
            Outcome::Commented {
                note_id: "n-1".to_string(),
                comment: Comment::new("alice", "hi".to_string()),
            },
        ];
        for outcome in outcomes {
            let out = router.route(1, outcome);
            assert_eq!(out.delivery, Delivery::All);
            assert!(out.reaches(1));
            assert!(out.reaches(2));
        }
    }
}
