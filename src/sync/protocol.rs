//! WebSocket protocol types for board synchronization.
//!
//! This module defines the messages exchanged between clients and the board
//! server over the `/ws` endpoint.
//!
//! # Framing
//!
//! Each text frame is one JSON envelope with an `event` name and a `data`
//! payload:
//!
//! ```json
//! {"event": "note:create", "data": {"title": "Groceries", "x": 40, "y": 80}}
//! ```
//!
//! ## Client → Server ([`ClientMessage`])
//! - `user:join`: register a display name
//! - `board:init`: request a full snapshot
//! - `note:create`, `note:update`, `note:delete`: note lifecycle
//! - `note:comment`: append a comment
//! - `note:editing`: acquire or release the advisory edit lock
//!
//! ## Server → Client ([`ServerMessage`])
//! - `board:data`: full snapshot (sender only)
//! - `presence:users`: presence list (everyone)
//! - `note:created`, `note:updated`, `note:deleted`, `note:commented` (everyone)
//! - `server:error`: rejected request (sender only)

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::models::{Comment, Note, NoteDraft, NotePatch, User};

// ============================================================================
// Client → Server Messages
// ============================================================================

/// Payload of `user:join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinPayload {
    pub name: String,
}

/// Payload of `note:delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletePayload {
    pub id: String,
}

/// Payload of `note:comment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentPayload {
    pub note_id: String,
    pub text: String,
}

/// Payload of `note:editing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditingPayload {
    pub note_id: String,
    pub is_editing: bool,
}

/// A validated inbound intent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    #[serde(rename = "user:join")]
    UserJoin(JoinPayload),
    #[serde(rename = "board:init")]
    BoardInit,
    #[serde(rename = "note:create")]
    NoteCreate(NoteDraft),
    #[serde(rename = "note:update")]
    NoteUpdate(NotePatch),
    #[serde(rename = "note:delete")]
    NoteDelete(DeletePayload),
    #[serde(rename = "note:comment")]
    NoteComment(CommentPayload),
    #[serde(rename = "note:editing")]
    NoteEditing(EditingPayload),
}

/// Raw envelope before the payload is checked against its event's schema.
#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Why an inbound frame was rejected.
///
/// The `Display` text is sent back verbatim as the `server:error` message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("invalid payload for {event}: {source}")]
    InvalidPayload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientMessage {
    /// Parse and validate one text frame.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text).map_err(ProtocolError::Malformed)?;
        let data = envelope.data;

        match envelope.event.as_str() {
            "user:join" => payload("user:join", data).map(ClientMessage::UserJoin),
            // board:init carries no fields; whatever was sent is ignored
            "board:init" => Ok(ClientMessage::BoardInit),
            // a missing note:create payload is an empty draft
            "note:create" if data.is_null() => Ok(ClientMessage::NoteCreate(NoteDraft::default())),
            "note:create" => payload("note:create", data).map(ClientMessage::NoteCreate),
            "note:update" => payload("note:update", data).map(ClientMessage::NoteUpdate),
            "note:delete" => payload("note:delete", data).map(ClientMessage::NoteDelete),
            "note:comment" => payload("note:comment", data).map(ClientMessage::NoteComment),
            "note:editing" => payload("note:editing", data).map(ClientMessage::NoteEditing),
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }

    /// Wire name of this intent.
    pub fn event_name(&self) -> &'static str {
        match self {
            ClientMessage::UserJoin(_) => "user:join",
            ClientMessage::BoardInit => "board:init",
            ClientMessage::NoteCreate(_) => "note:create",
            ClientMessage::NoteUpdate(_) => "note:update",
            ClientMessage::NoteDelete(_) => "note:delete",
            ClientMessage::NoteComment(_) => "note:comment",
            ClientMessage::NoteEditing(_) => "note:editing",
        }
    }
}

fn payload<T: DeserializeOwned>(
    event: &'static str,
    data: serde_json::Value,
) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|source| ProtocolError::InvalidPayload { event, source })
}

// ============================================================================
// Server → Client Messages
// ============================================================================

/// Outbound events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    /// Full snapshot of the board.
    #[serde(rename = "board:data")]
    BoardData { notes: Vec<Note> },

    /// Everyone currently connected, one entry per connection.
    #[serde(rename = "presence:users")]
    PresenceUsers { users: Vec<User> },

    #[serde(rename = "note:created")]
    NoteCreated(Note),

    #[serde(rename = "note:updated")]
    NoteUpdated(Note),

    #[serde(rename = "note:deleted")]
    NoteDeleted { id: String },

    #[serde(rename = "note:commented")]
    NoteCommented {
        #[serde(rename = "noteId")]
        note_id: String,
        comment: Comment,
    },

    /// A request failed. Free text only; no error code.
    #[serde(rename = "server:error")]
    ServerError { message: String },
}

impl ServerMessage {
    /// Wire name of this event.
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMessage::BoardData { .. } => "board:data",
            ServerMessage::PresenceUsers { .. } => "presence:users",
            ServerMessage::NoteCreated(_) => "note:created",
            ServerMessage::NoteUpdated(_) => "note:updated",
            ServerMessage::NoteDeleted { .. } => "note:deleted",
            ServerMessage::NoteCommented { .. } => "note:commented",
            ServerMessage::ServerError { .. } => "server:error",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
