//! JSON text codec for envelopes.
//!
//! Decoding never fails outright: anything that is not one of the six
//! known envelopes (bad JSON, unknown `kind`, unknown role, missing
//! field, wrong field type) comes back as [`Envelope::Invalid`] with
//! the parser's message, and the caller decides what to do with it.

use thiserror::Error;

use chat_core::Envelope;

use crate::wire_types::WireEnvelope;

/// Errors that can arise when encoding an envelope.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// `Envelope::Invalid` only exists on the receiving side.
    #[error("envelope has no wire form: {0}")]
    NotEncodable(&'static str),

    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode one text frame.
pub fn decode(text: &str) -> Envelope {
    match serde_json::from_str::<WireEnvelope>(text) {
        Ok(wire) => wire.into(),
        Err(err) => Envelope::invalid(err.to_string()),
    }
}

/// Decode a binary frame; it must be UTF-8 JSON.
pub fn decode_bytes(bytes: &[u8]) -> Envelope {
    match std::str::from_utf8(bytes) {
        Ok(text) => decode(text),
        Err(err) => Envelope::invalid(format!("frame is not utf-8: {err}")),
    }
}

/// Encode one envelope as a compact JSON text frame.
pub fn encode(envelope: &Envelope) -> Result<String, ProtocolError> {
    let wire = WireEnvelope::from_envelope(envelope)
        .ok_or(ProtocolError::NotEncodable(envelope.kind()))?;
    Ok(serde_json::to_string(&wire)?)
}
