//! Configuration for the chat server.
//!
//! Defaults can be overridden via environment variables:
//!
//! - `CHAT_BIND_ADDR`    (default: "0.0.0.0")
//! - `CHAT_PORT`         (default: "8080")
//! - `CHAT_MAX_CLIENTS`  (default: "1024")
//! - `CHAT_PATH`         (default: "/randomchat")
//! - `CHAT_HISTORY_FILE` (default: "history.csv"; empty disables history)

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// IP address / interface to bind to (e.g. "0.0.0.0" or "127.0.0.1").
    pub bind_addr: String,

    /// TCP port to listen on. `0` picks a free port.
    pub port: u16,

    /// Maximum number of simultaneously connected clients.
    pub max_clients: usize,

    /// Request path accepted for the WebSocket upgrade.
    pub path: String,

    /// Where delivered messages are appended; `None` disables history.
    pub history_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            max_clients: 1024,
            path: "/randomchat".to_string(),
            history_file: Some(PathBuf::from("history.csv")),
        }
    }
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reading from an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let bind_addr = lookup("CHAT_BIND_ADDR").unwrap_or(defaults.bind_addr);
        let port = parse_or_default(&lookup, "CHAT_PORT", defaults.port)?;
        let max_clients = parse_or_default(&lookup, "CHAT_MAX_CLIENTS", defaults.max_clients)?;

        let path = match lookup("CHAT_PATH") {
            Some(path) if path.starts_with('/') => path,
            Some(path) => {
                return Err(ConfigError::Invalid {
                    key: "CHAT_PATH",
                    value: path,
                    reason: "must start with '/'".to_string(),
                })
            }
            None => defaults.path,
        };

        let history_file = match lookup("CHAT_HISTORY_FILE") {
            Some(file) if file.trim().is_empty() => None,
            Some(file) => Some(PathBuf::from(file)),
            None => defaults.history_file,
        };

        Ok(Config {
            bind_addr,
            port,
            max_clients,
            path,
            history_file,
        })
    }

    /// Convenience: `addr:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}
