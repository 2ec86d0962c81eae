//! chat-protocol
//!
//! Wire-level encoding/decoding for the random chat server.
//!
//! This crate is responsible for turning logical envelopes
//! (`chat_core::Envelope`) into text frames and back again, and for
//! the on-disk line format of delivered-message history.
//!
//! - [`json_codec`] : JSON text frames exchanged over the WebSocket
//! - [`csv_codec`]  : CSV lines for the message history file

pub mod wire_types;
pub mod json_codec;
pub mod csv_codec;

pub use json_codec::{decode, encode, ProtocolError};
