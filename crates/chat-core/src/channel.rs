//! The seam between the pairing core and whatever carries bytes.
//!
//! The core never sees sockets. It is handed something that implements
//! [`Channel`] when a connection is admitted and talks to the remote
//! party only through it.

use crate::envelope::Envelope;

/// Result of pushing an envelope at a channel.
///
/// A remote side that vanished between "is it open?" and "send" is an
/// expected race, so it is a value here rather than an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Closed,
}

impl SendOutcome {
    pub fn is_sent(self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

/// Outbound half of a connection, as seen by the core.
///
/// Implementations must not block: `send` on a channel whose remote side
/// is gone returns [`SendOutcome::Closed`] straight away.
pub trait Channel {
    /// Queue an envelope for delivery.
    fn send(&self, envelope: &Envelope) -> SendOutcome;

    /// Whether the remote side is still there.
    fn is_open(&self) -> bool;

    /// Terminate the channel from the system side.
    ///
    /// Calling this on an already closed channel is a no-op.
    fn close(&self);
}
