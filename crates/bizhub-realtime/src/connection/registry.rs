//! Connection registry: live handles indexed by user and by connection.

use std::sync::Arc;

use bizhub_core::types::id::{ConnectionId, UserId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::handle::ConnectionHandle;

/// Outcome of adding a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The connection ID was already present; nothing changed.
    Duplicate,
    /// Added. `first` is true when the user had no other live connection.
    Added { first: bool },
}

/// Outcome of removing a handle.
#[derive(Debug, Clone)]
pub struct Removal {
    pub handle: Arc<ConnectionHandle>,
    /// True when this was the user's last live connection.
    pub last: bool,
}

/// Thread-safe index of all live connections.
///
/// A user is online exactly when they have an entry in `by_user`; entries
/// are removed as soon as their list empties.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    by_user: DashMap<UserId, Vec<Arc<ConnectionHandle>>>,
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a handle. Idempotent per connection ID.
    pub fn insert(&self, handle: Arc<ConnectionHandle>) -> Registration {
        match self.by_id.entry(handle.id) {
            Entry::Occupied(_) => return Registration::Duplicate,
            Entry::Vacant(slot) => {
                slot.insert(handle.clone());
            }
        }
        let mut connections = self.by_user.entry(handle.user_id).or_default();
        let first = connections.is_empty();
        connections.push(handle);
        Registration::Added { first }
    }

    /// Removes a handle by ID. `None` if it was not registered.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Removal> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        let last = match self.by_user.get_mut(&handle.user_id) {
            Some(mut connections) => {
                connections.retain(|c| c.id != *conn_id);
                connections.is_empty()
            }
            None => true,
        };
        if last {
            self.by_user
                .remove_if(&handle.user_id, |_, connections| connections.is_empty());
        }
        Some(Removal { handle, last })
    }

    /// All live handles of a user, oldest first.
    pub fn user_connections(&self, user_id: &UserId) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Gets a specific connection by ID.
    pub fn get(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        self.by_id.get(conn_id).map(|entry| entry.value().clone())
    }

    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.by_user.contains_key(user_id)
    }

    /// Every online user, sorted for stable output.
    pub fn online_users(&self) -> Vec<UserId> {
        let mut users: Vec<UserId> = self.by_user.iter().map(|entry| *entry.key()).collect();
        users.sort();
        users
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Returns total number of live connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of online users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}
