//! chat-core
//!
//! Pure pairing and relay logic:
//! - envelopes (typed status / application messages)
//! - connection directory (identity, address tag, lifecycle state)
//! - matchmaker (FIFO waiting pool + symmetric pairing map)
//! - chat room (relay, disconnect propagation, presence broadcast)
//!
//! Transport and persistence are reached only through the
//! [`Channel`] and [`HistorySink`] traits.

pub mod channel;
pub mod connection;
pub mod directory;
pub mod envelope;
pub mod matchmaker;
pub mod record;
pub mod room;

pub use channel::{Channel, SendOutcome};
pub use connection::{ConnectionId, ConnectionState};
pub use directory::{Directory, Entry};
pub use envelope::{AppMessage, Envelope, Role};
pub use matchmaker::{Dissolution, Matchmaker, Pair};
pub use record::{DeliveredRecord, HistorySink, NullSink};
pub use room::{ChatRoom, RoomStats, RouteOutcome};
