//! Unified error type for the Wordlink server.

use wordlink_protocol::ProtocolError;
use wordlink_room::RoomError;
use wordlink_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum WordlinkError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (validation, not found, turn rules).
    #[error(transparent)]
    Room(#[from] RoomError),
}
