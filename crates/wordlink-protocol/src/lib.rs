//! Wire protocol for Wordlink.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`PlayerId`], [`RoomCode`], [`Player`], [`GameState`]):
//!   identities and the room snapshot attached to room events.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]): the request/response
//!   vocabulary, tagged as `{"event": ..., "data": ...}`.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how events become bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong doing so.
//!
//! The protocol layer knows nothing about connections or game rules.
//!
//! ```text
//! Transport (frames) → Protocol (events) → Room (rules)
//! ```

mod codec;
mod error;
mod events;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, ServerEvent};
pub use types::{GameId, GameState, Player, PlayerId, RoomCode};
