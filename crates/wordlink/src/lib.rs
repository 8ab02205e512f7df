//! # Wordlink
//!
//! Real-time multiplayer word-association game server.
//!
//! Players create or join a room by code, then take turns submitting a word
//! related to the current one. Accepted words score points with a streak
//! bonus; rooms idle for too long are swept away.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordlink::prelude::*;
//!
//! # async fn start() -> Result<(), WordlinkError> {
//! let server = WordlinkServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod dispatch;
mod error;
mod handler;
mod lifecycle;
mod server;

pub use dispatch::{SLOW_EVENT_THRESHOLD, dispatch, failure_event};
pub use error::WordlinkError;
pub use lifecycle::{Binding, ConnectionLifecycleManager};
pub use server::{WordlinkServer, WordlinkServerBuilder};

/// Everything needed to run a server or talk to one.
pub mod prelude {
    pub use crate::{
        ConnectionLifecycleManager, WordlinkError, WordlinkServer, WordlinkServerBuilder,
    };
    pub use wordlink_protocol::{
        ClientEvent, Codec, GameId, GameState, JsonCodec, Player, PlayerId, RoomCode, ServerEvent,
    };
    pub use wordlink_room::{
        AuditSink, JsonLinesAuditSink, MemoryAuditSink, RoomConfig, RoomError, RoomRegistry,
        WordRecord,
    };
    pub use wordlink_transport::ConnectionId;
}
