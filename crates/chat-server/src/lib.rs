//! chat-server
//!
//! Async WebSocket server for anonymous one-to-one chat.

pub mod config;
pub mod history;
pub mod server;
pub mod types;
pub mod ws_channel;

// these are internal modules, not re-exported
mod client;
mod room_task;
