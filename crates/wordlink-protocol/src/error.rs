//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the bytes on the wire were the problem,
//! never the game rules: rule violations live in the room crate.

/// Errors that can occur while encoding or decoding events.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serializing an event to bytes failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// The incoming bytes are not a well-formed event.
    ///
    /// Common causes: malformed JSON, an unknown `event` tag, or a `data`
    /// object of the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame parsed but is not acceptable (e.g. not valid UTF-8 for a
    /// text-only peer).
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
