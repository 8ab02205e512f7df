//! Rooms, turns, and housekeeping for Wordlink.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! [`RoomState`]; all operations on a room are commands processed one at a
//! time by that task.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms, resolves codes, removes rooms
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`turn`]: the submit-word and pause rules
//! - [`words`]: the relatedness oracle
//! - [`HealthMonitor`]: evicts idle and empty rooms
//! - [`AuditLog`]: non-blocking record of accepted words

mod config;
mod error;
mod health;
mod registry;
mod room;
mod state;

pub mod audit;
pub mod code;
pub mod turn;
pub mod words;

pub use audit::{AuditError, AuditLog, AuditSink, JsonLinesAuditSink, MemoryAuditSink, WordRecord};
pub use config::RoomConfig;
pub use error::RoomError;
pub use health::{HealthMonitor, HealthMonitorHandle};
pub use registry::{CreatedRoom, JoinedRoom, RoomRegistry};
pub use room::{Departure, PlayerSender, RoomHandle};
pub use state::RoomState;
pub use turn::AcceptedWord;
