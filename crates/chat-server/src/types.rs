//! Shared types for the chat server.
//!
//! This module defines:
//! - `Outbound`: frames queued for a connection's writer task
//! - `RoomRequest`: transport events flowing into the room task
//! - channel aliases between connection tasks and the room task

use chat_core::Envelope;
use tokio::sync::{mpsc, oneshot};

use crate::ws_channel::WsChannel;

pub use chat_core::ConnectionId;

/// Frame queued for a single connection's writer task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Encoded JSON envelope.
    Text(String),

    /// Close the WebSocket from the server side.
    Close,
}

pub type OutboundTx = mpsc::UnboundedSender<Outbound>;
pub type OutboundRx = mpsc::UnboundedReceiver<Outbound>;

/// Transport event flowing from a connection task into the room task.
///
/// These three are the entire surface the room needs from the network
/// layer.
#[derive(Debug)]
pub enum RoomRequest {
    /// A handshake completed. The room replies with the assigned id.
    Admit {
        channel: WsChannel,
        address: String,
        reply: oneshot::Sender<ConnectionId>,
    },

    /// A decoded inbound frame.
    Message { id: ConnectionId, envelope: Envelope },

    /// The connection's stream ended.
    Close { id: ConnectionId },
}

/// Channel from connection tasks -> room task.
pub type RoomTx = mpsc::UnboundedSender<RoomRequest>;
pub type RoomRx = mpsc::UnboundedReceiver<RoomRequest>;
