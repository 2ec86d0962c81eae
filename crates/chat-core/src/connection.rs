//! Connection identity and lifecycle state.

use std::fmt;

/// Identifier for an admitted connection.
///
/// Assigned by the [`Directory`](crate::directory::Directory) on admission
/// and never reused for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a connection is in its lifecycle.
///
/// ```text
/// Waiting --(pair formed)--> Paired
///    |                         |
///    +------(closed)-----------+--> Terminated
/// ```
///
/// A connection never goes back to `Waiting` once paired.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Waiting,
    Paired,
    Terminated,
}

impl ConnectionState {
    /// Short lowercase label, handy for log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Waiting => "waiting",
            ConnectionState::Paired => "paired",
            ConnectionState::Terminated => "terminated",
        }
    }
}
