//! Connection directory.
//!
//! Tracks every live connection's identity, address tag, lifecycle
//! state and outbound [`Channel`]. The address book lives here rather
//! than on the pairing map so a delivery record can still cite both
//! addresses regardless of what the matchmaker is doing.

use std::collections::BTreeMap;

use crate::connection::{ConnectionId, ConnectionState};

/// Everything the directory knows about one connection.
#[derive(Debug)]
pub struct Entry<C> {
    pub id: ConnectionId,

    /// Remote address tag, captured once at admission.
    address: String,

    pub state: ConnectionState,

    pub channel: C,
}

impl<C> Entry<C> {
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Registry of tracked connections.
///
/// Keyed by `ConnectionId` in a `BTreeMap` so iteration (and therefore
/// broadcast order) follows admission order.
#[derive(Debug)]
pub struct Directory<C> {
    entries: BTreeMap<ConnectionId, Entry<C>>,
    next_id: u64,
}

impl<C> Default for Directory<C> {
    fn default() -> Self {
        Directory {
            entries: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<C> Directory<C> {
    pub fn new() -> Self {
        Directory::default()
    }

    /// Register a new connection in `Waiting` state.
    pub fn admit(&mut self, channel: C, address: impl Into<String>) -> ConnectionId {
        let id = ConnectionId(self.next_id);
        self.next_id += 1;

        self.entries.insert(
            id,
            Entry {
                id,
                address: address.into(),
                state: ConnectionState::Waiting,
                channel,
            },
        );

        id
    }

    /// Drop every trace of `id`. Returns the removed entry the first
    /// time, `None` on every later call.
    pub fn remove(&mut self, id: ConnectionId) -> Option<Entry<C>> {
        let mut entry = self.entries.remove(&id)?;
        entry.state = ConnectionState::Terminated;
        Some(entry)
    }

    /// Number of tracked connections (waiting + paired).
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&Entry<C>> {
        self.entries.get(&id)
    }

    pub fn address(&self, id: ConnectionId) -> Option<&str> {
        self.entries.get(&id).map(Entry::address)
    }

    pub fn channel(&self, id: ConnectionId) -> Option<&C> {
        self.entries.get(&id).map(|e| &e.channel)
    }

    /// Lifecycle state; untracked ids report `Terminated`.
    pub fn state(&self, id: ConnectionId) -> ConnectionState {
        self.entries
            .get(&id)
            .map(|e| e.state)
            .unwrap_or(ConnectionState::Terminated)
    }

    pub fn set_state(&mut self, id: ConnectionId, state: ConnectionState) {
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.state = state;
        }
    }

    /// Tracked entries in admission order.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<C>> {
        self.entries.values()
    }
}
