//! Codec trait and implementations for serializing/deserializing events.
//!
//! The server never formats JSON by hand: it hands a [`ServerEvent`] to a
//! [`Codec`] and ships the bytes. Swapping the wire format means writing one
//! more `Codec` impl.
//!
//! [`ServerEvent`]: crate::ServerEvent

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Browser clients parse these frames directly, so JSON is the only format
/// the server speaks today. Behind the `json` feature (enabled by default).
///
/// ## Example
///
/// ```rust
/// use wordlink_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = br#"{"event":"create_room","data":{"player_name":"Ann"}}"#;
///
/// let event: ClientEvent = codec.decode(bytes).unwrap();
/// assert_eq!(
///     event,
///     ClientEvent::CreateRoom { player_name: "Ann".into() }
/// );
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
