//! FIFO waiting pool and symmetric pairing map.
//!
//! Invariants held after every call:
//! - an id is in at most one of {pool, pairs};
//! - `pairs[a] == b` iff `pairs[b] == a`, and never `a == b`.
//!
//! The matchmaker owns no channels; it only moves ids around. Whoever
//! owns it must give it exclusive access (`&mut self`) for each call,
//! which is what makes `enqueue` / `dissolve` atomic with respect to
//! each other.

use std::collections::{HashMap, VecDeque};

use crate::connection::ConnectionId;

/// A freshly formed pair. `first` waited longer than `second`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Pair {
    pub first: ConnectionId,
    pub second: ConnectionId,
}

/// What `dissolve` found for an id.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Dissolution {
    /// Was paired; both directions have been removed.
    Paired(ConnectionId),

    /// Was still in the waiting pool; it has been removed.
    Waiting,

    /// Not known to the matchmaker (already dissolved, or never enqueued).
    Untracked,
}

impl Dissolution {
    pub fn partner(self) -> Option<ConnectionId> {
        match self {
            Dissolution::Paired(partner) => Some(partner),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct Matchmaker {
    /// Oldest arrival at the front.
    pool: VecDeque<ConnectionId>,

    /// Both directions of every pair.
    pairs: HashMap<ConnectionId, ConnectionId>,
}

impl Matchmaker {
    pub fn new() -> Self {
        Matchmaker::default()
    }

    /// Append `id` to the pool; if two or more are waiting, pop the two
    /// oldest and pair them.
    ///
    /// Enqueuing an id that is already pooled or paired is ignored.
    pub fn enqueue(&mut self, id: ConnectionId) -> Option<Pair> {
        if self.is_tracked(id) {
            return None;
        }

        self.pool.push_back(id);

        if self.pool.len() < 2 {
            return None;
        }

        let first = self.pool.pop_front()?;
        let second = self.pool.pop_front()?;

        self.pairs.insert(first, second);
        self.pairs.insert(second, first);

        Some(Pair { first, second })
    }

    /// Remove `id` from wherever it is.
    pub fn dissolve(&mut self, id: ConnectionId) -> Dissolution {
        if let Some(partner) = self.pairs.remove(&id) {
            self.pairs.remove(&partner);
            return Dissolution::Paired(partner);
        }

        if self.remove_waiting(id) {
            Dissolution::Waiting
        } else {
            Dissolution::Untracked
        }
    }

    /// Remove `id` from the pool only. Returns whether it was there.
    pub fn remove_waiting(&mut self, id: ConnectionId) -> bool {
        match self.pool.iter().position(|&waiting| waiting == id) {
            Some(pos) => {
                self.pool.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn partner_of(&self, id: ConnectionId) -> Option<ConnectionId> {
        self.pairs.get(&id).copied()
    }

    pub fn is_waiting(&self, id: ConnectionId) -> bool {
        self.pool.contains(&id)
    }

    pub fn is_paired(&self, id: ConnectionId) -> bool {
        self.pairs.contains_key(&id)
    }

    fn is_tracked(&self, id: ConnectionId) -> bool {
        self.is_paired(id) || self.is_waiting(id)
    }

    pub fn waiting_len(&self) -> usize {
        self.pool.len()
    }

    /// Number of paired connections (twice the number of pairs).
    pub fn paired_len(&self) -> usize {
        self.pairs.len()
    }

    /// Waiting ids, oldest first.
    pub fn waiting(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.pool.iter().copied()
    }

    /// Verify the structural invariants. Returns a description of the
    /// first violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        for (&a, &b) in &self.pairs {
            if a == b {
                return Err(format!("{a} is paired with itself"));
            }
            if self.pairs.get(&b) != Some(&a) {
                return Err(format!("{a} -> {b} has no matching {b} -> {a}"));
            }
            if self.pool.contains(&a) {
                return Err(format!("{a} is both waiting and paired"));
            }
        }

        for (i, id) in self.pool.iter().enumerate() {
            if self.pool.iter().skip(i + 1).any(|other| other == id) {
                return Err(format!("{id} appears twice in the waiting pool"));
            }
        }

        Ok(())
    }
}
