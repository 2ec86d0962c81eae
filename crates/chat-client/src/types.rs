// crates/chat-client/src/types.rs

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the chat client, optionally read from a TOML file.
///
/// ```toml
/// server_url = "ws://chat.example.org/randomchat"
/// display_name = "me"
/// history_limit = 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,

    /// Label shown next to your own messages.
    pub display_name: String,

    /// How many chat lines to keep on screen.
    pub history_limit: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080/randomchat".to_string(),
            display_name: "You".to_string(),
            history_limit: 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ClientConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigLoadError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Commands from the UI to the network task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetCommand {
    Say(String),
    Leave,
}

/// Events from the network task to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    Connected,
    Envelope(chat_core::Envelope),
    /// The session is over; carries an error description if it ended badly.
    Disconnected(Option<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ClientConfig::from_toml_str(r#"display_name = "ghost""#).unwrap();
        assert_eq!(config.display_name, "ghost");
        assert_eq!(config.server_url, ClientConfig::default().server_url);
        assert_eq!(config.history_limit, 500);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(matches!(
            ClientConfig::from_toml_str("history_limit = \"lots\""),
            Err(ConfigLoadError::Toml(_))
        ));
    }
}
