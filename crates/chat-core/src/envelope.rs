//! Envelopes exchanged between the system and a connection.
//!
//! These are **transport-agnostic** logical messages. The JSON text
//! encoding lives in the `chat-protocol` crate; this module is purely
//! logical.
//!
//! Status envelopes only ever flow system -> connection. Application
//! envelopes carry a declared sender/receiver role so the relay can
//! reject anything that does not claim to be client -> server.

/// Logical endpoint named in an application envelope.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Role {
    Client,
    Server,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Server => "server",
        }
    }
}

/// Body of a `clientMessage` / `serverMessage` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppMessage {
    pub sender: Role,
    pub receiver: Role,
    pub content: String,
}

impl AppMessage {
    /// True when the message claims to come from the connected party
    /// and to be addressed to the relay.
    pub fn is_client_to_server(&self) -> bool {
        self.sender == Role::Client && self.receiver == Role::Server
    }
}

/// A single message unit between the system and one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Sent once, right after admission.
    ConnectedToServer,

    /// Sent to both members of a newly formed pair.
    ConnectedToUser,

    /// Sent to a surviving partner just before the system closes it.
    DisconnectedFromServer,

    /// Current number of tracked connections.
    UserCount(usize),

    /// Application message as received from a connection.
    ClientMessage(AppMessage),

    /// Application message as forwarded to a partner.
    ServerMessage(AppMessage),

    /// Anything that failed to decode. Carries a human-readable reason
    /// for logs only; it is never sent anywhere.
    Invalid(String),
}

impl Envelope {
    /// Inbound application message, client -> server.
    pub fn client_message(content: impl Into<String>) -> Self {
        Envelope::ClientMessage(AppMessage {
            sender: Role::Client,
            receiver: Role::Server,
            content: content.into(),
        })
    }

    /// Outbound application message, server -> client.
    pub fn server_message(content: impl Into<String>) -> Self {
        Envelope::ServerMessage(AppMessage {
            sender: Role::Server,
            receiver: Role::Client,
            content: content.into(),
        })
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Envelope::Invalid(reason.into())
    }

    /// True for the three `statusMessage` variants.
    pub fn is_status(&self) -> bool {
        matches!(
            self,
            Envelope::ConnectedToServer
                | Envelope::ConnectedToUser
                | Envelope::DisconnectedFromServer
        )
    }

    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::ConnectedToServer
            | Envelope::ConnectedToUser
            | Envelope::DisconnectedFromServer => "statusMessage",
            Envelope::UserCount(_) => "userCount",
            Envelope::ClientMessage(_) => "clientMessage",
            Envelope::ServerMessage(_) => "serverMessage",
            Envelope::Invalid(_) => "invalid",
        }
    }
}
