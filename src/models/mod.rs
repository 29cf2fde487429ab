//! Data models for board entities.
//!
//! This module defines the core data structures:
//! - `Note` - A rectangular sticky note on the shared canvas
//! - `Comment` - An immutable remark appended to a note
//! - `User` - A presence entry for one live connection
//! - `NoteDraft` - Client-provided fields for creating a note
//! - `NotePatch` - Client-provided fields for a partial note update

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Default horizontal position for a new note.
pub const DEFAULT_X: f64 = 100.0;
/// Default vertical position for a new note.
pub const DEFAULT_Y: f64 = 100.0;
/// Default width for a new note.
pub const DEFAULT_WIDTH: f64 = 256.0;
/// Default height for a new note.
pub const DEFAULT_HEIGHT: f64 = 256.0;
/// Stacking order assigned to every freshly created note.
pub const INITIAL_Z_INDEX: u64 = 1;

/// Current time at the millisecond precision used on the wire.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A sticky note on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier (UUID v4), never reused
    pub id: String,

    /// Note title
    #[serde(default)]
    pub title: String,

    /// Note body
    #[serde(default)]
    pub content: String,

    /// Horizontal position on the canvas
    pub x: f64,

    /// Vertical position on the canvas
    pub y: f64,

    /// Rendered width
    pub width: f64,

    /// Rendered height
    pub height: f64,

    /// Stacking order; only the z-order allocator changes it
    pub z_index: u64,

    /// Display name of the identity holding the edit lock
    pub editing: Option<String>,

    /// Display name of the last identity to mutate the note
    pub updated_by: String,

    /// Comments in insertion order
    #[serde(default)]
    pub comments: Vec<Comment>,

    /// Creation time, serialized as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Note {
    /// Build a new note from a draft, filling in every default.
    pub fn new(id: String, draft: NoteDraft, author: &str) -> Self {
        Self {
            id,
            title: draft.title.unwrap_or_default(),
            content: draft.content.unwrap_or_default(),
            x: draft.x.unwrap_or(DEFAULT_X),
            y: draft.y.unwrap_or(DEFAULT_Y),
            width: draft.width.unwrap_or(DEFAULT_WIDTH),
            height: draft.height.unwrap_or(DEFAULT_HEIGHT),
            z_index: INITIAL_Z_INDEX,
            editing: None,
            updated_by: author.to_string(),
            comments: Vec::new(),
            timestamp: now(),
        }
    }

    /// Overwrite every field the patch provides. Shallow: whole fields are replaced.
    pub fn apply_patch(&mut self, patch: &NotePatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref content) = patch.content {
            self.content = content.clone();
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
    }

    /// Whether `name` currently holds this note's edit lock.
    pub fn is_locked_by(&self, name: &str) -> bool {
        self.editing.as_deref() == Some(name)
    }
}

/// A comment attached to a note. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Display name of the author
    pub user: String,

    /// Comment body
    pub text: String,

    /// Creation time, serialized as epoch milliseconds
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment with a fresh id and the current time.
    pub fn new(user: &str, text: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user: user.to_string(),
            text,
            timestamp: now(),
        }
    }
}

/// One entry of the presence list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Display name chosen on join
    pub name: String,
}

/// Fields a client may supply when creating a note.
///
/// Anything absent falls back to the defaults in [`Note::new`]. Server-owned
/// fields (`id`, `timestamp`, `comments`, `zIndex`, `editing`, `updatedBy`)
/// are not part of the draft and are ignored if sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// A partial note update keyed by `id`.
///
/// Only client-editable fields are carried. `zIndex` and `editing` belong to
/// the z-order allocator and the lock manager, so they are dropped here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePatch {
    /// Target note
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl NotePatch {
    /// Create an empty patch for the given note.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}
