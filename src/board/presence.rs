//! Identity registry: who is connected and under which display name.

use std::collections::BTreeMap;

use crate::models::User;

/// Transport-assigned identifier for one live connection.
pub type ConnectionId = u64;

/// Maps each active connection to its display name.
///
/// Names are not unique: two connections may join under the same name and
/// both appear in the presence list.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    names: BTreeMap<ConnectionId, String>,
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or rename) the identity behind a connection.
    pub fn join(&mut self, conn: ConnectionId, name: impl Into<String>) {
        self.names.insert(conn, name.into());
    }

    /// Display name for a connection, if it has joined.
    pub fn name(&self, conn: ConnectionId) -> Option<&str> {
        self.names.get(&conn).map(String::as_str)
    }

    /// Forget a connection. Unknown connections are a no-op.
    pub fn remove(&mut self, conn: ConnectionId) -> Option<String> {
        self.names.remove(&conn)
    }

    /// Every live display name, one per connection, ordered by connection id.
    pub fn all_names(&self) -> Vec<String> {
        self.names.values().cloned().collect()
    }

    /// Presence list in wire form.
    pub fn users(&self) -> Vec<User> {
        self.names
            .values()
            .map(|name| User { name: name.clone() })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
