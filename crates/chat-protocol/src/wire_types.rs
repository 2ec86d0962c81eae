//! Serde mirror of the JSON envelopes.
//!
//! ```text
//! {"kind":"statusMessage","status":"connectedToServer"}
//! {"kind":"statusMessage","status":"connectedToUser"}
//! {"kind":"statusMessage","status":"disconnectedFromServer"}
//! {"kind":"userCount","userCount":3}
//! {"kind":"clientMessage","sender":"client","receiver":"server","messageContent":"hi"}
//! {"kind":"serverMessage","sender":"server","receiver":"client","messageContent":"hi"}
//! ```
//!
//! These types exist only at the boundary; the rest of the system works
//! with [`chat_core::Envelope`].

use serde::{Deserialize, Serialize};

use chat_core::{AppMessage, Envelope, Role};

/// One JSON frame, discriminated by its `kind` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum WireEnvelope {
    StatusMessage {
        status: WireStatus,
    },
    UserCount {
        #[serde(rename = "userCount")]
        user_count: u64,
    },
    ClientMessage(WireAppMessage),
    ServerMessage(WireAppMessage),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireStatus {
    ConnectedToServer,
    ConnectedToUser,
    DisconnectedFromServer,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    Client,
    Server,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireAppMessage {
    pub sender: WireRole,
    pub receiver: WireRole,
    #[serde(rename = "messageContent")]
    pub message_content: String,
}

// -----------------------------------------------------------------------------
// Conversions
// -----------------------------------------------------------------------------

impl From<WireRole> for Role {
    fn from(role: WireRole) -> Self {
        match role {
            WireRole::Client => Role::Client,
            WireRole::Server => Role::Server,
        }
    }
}

impl From<Role> for WireRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Client => WireRole::Client,
            Role::Server => WireRole::Server,
        }
    }
}

impl From<WireAppMessage> for AppMessage {
    fn from(msg: WireAppMessage) -> Self {
        AppMessage {
            sender: msg.sender.into(),
            receiver: msg.receiver.into(),
            content: msg.message_content,
        }
    }
}

impl From<&AppMessage> for WireAppMessage {
    fn from(msg: &AppMessage) -> Self {
        WireAppMessage {
            sender: msg.sender.into(),
            receiver: msg.receiver.into(),
            message_content: msg.content.clone(),
        }
    }
}

impl From<WireEnvelope> for Envelope {
    fn from(wire: WireEnvelope) -> Self {
        match wire {
            WireEnvelope::StatusMessage { status } => match status {
                WireStatus::ConnectedToServer => Envelope::ConnectedToServer,
                WireStatus::ConnectedToUser => Envelope::ConnectedToUser,
                WireStatus::DisconnectedFromServer => Envelope::DisconnectedFromServer,
            },
            WireEnvelope::UserCount { user_count } => {
                Envelope::UserCount(usize::try_from(user_count).unwrap_or(usize::MAX))
            }
            WireEnvelope::ClientMessage(msg) => Envelope::ClientMessage(msg.into()),
            WireEnvelope::ServerMessage(msg) => Envelope::ServerMessage(msg.into()),
        }
    }
}

impl WireEnvelope {
    /// Wire form of an envelope; `None` for [`Envelope::Invalid`],
    /// which has no representation.
    pub fn from_envelope(envelope: &Envelope) -> Option<Self> {
        let wire = match envelope {
            Envelope::ConnectedToServer => WireEnvelope::StatusMessage {
                status: WireStatus::ConnectedToServer,
            },
            Envelope::ConnectedToUser => WireEnvelope::StatusMessage {
                status: WireStatus::ConnectedToUser,
            },
            Envelope::DisconnectedFromServer => WireEnvelope::StatusMessage {
                status: WireStatus::DisconnectedFromServer,
            },
            Envelope::UserCount(n) => WireEnvelope::UserCount {
                user_count: *n as u64,
            },
            Envelope::ClientMessage(msg) => WireEnvelope::ClientMessage(msg.into()),
            Envelope::ServerMessage(msg) => WireEnvelope::ServerMessage(msg.into()),
            Envelope::Invalid(_) => return None,
        };
        Some(wire)
    }
}
