//! Connection plumbing for Wordlink.
//!
//! The server accepts browser clients over WebSocket and only ever moves
//! whole frames; decoding them is the protocol crate's job.
//!
//! # Feature Flags
//!
//! - `websocket` (default): [`WebSocketTransport`] and
//!   [`WebSocketConnection`] via `tokio-tungstenite`

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Process-unique id of an accepted connection.
///
/// The server keys room memberships on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
