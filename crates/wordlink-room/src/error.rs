//! Error types for the room layer.
//!
//! The `Display` text of each variant is what the client sees in its
//! `error` or `word_rejected` event, so the wording is player-facing.

use wordlink_protocol::{PlayerId, RoomCode};

/// Errors that can occur during room operations.
///
/// None of these leave a room half-mutated: every check runs before the
/// single commit step.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// A required field was missing or empty.
    #[error("{0}")]
    Validation(String),

    /// No active room has this code.
    #[error("Room not found")]
    RoomNotFound(RoomCode),

    /// The room has no player with this id.
    #[error("Player not found")]
    PlayerNotFound(PlayerId),

    /// A non-host attempted a host-only action.
    #[error("Only the host can pause/resume the game")]
    NotHost(PlayerId),

    /// The room is paused; submissions are refused.
    #[error("Game is paused")]
    Paused,

    /// The submitter does not hold the turn.
    #[error("It's not your turn!")]
    NotYourTurn(PlayerId),

    /// The word was already played in this room.
    #[error("Word already used")]
    DuplicateWord(String),

    /// The word does not share a category with the current word.
    #[error("\"{word}\" is not related to \"{current}\"")]
    UnrelatedWord { word: String, current: String },

    /// Something unexpected went wrong, such as a room task dying.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RoomError {
    /// `true` for the two rejections that are broadcast to the whole room
    /// with a snapshot instead of being reported to the sender alone.
    pub fn is_word_rejection(&self) -> bool {
        matches!(self, Self::DuplicateWord(_) | Self::UnrelatedWord { .. })
    }

    /// `true` for errors that indicate a bug or infrastructure failure
    /// rather than a rule the player broke.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}
