//! Identity types and the room snapshot that travel on the wire.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player within the process.
///
/// Newtype over `u64` so a `PlayerId` can never be passed where a
/// [`GameId`] is expected. `#[serde(transparent)]` keeps the wire shape a
/// plain number (`42`, not `{"0":42}`), which is what clients echo back in
/// `submit_word` and `toggle_pause`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifies one game (one room's lifetime) in audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// The short human-readable code players type to join a room.
///
/// Codes are case-insensitive for players; [`RoomCode::new`] normalizes to
/// trimmed upper case so `"abc123 "` and `"ABC123"` address the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Builds a normalized room code.
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the code is empty after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A participant in a room, as every client sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Cumulative points from accepted words.
    pub score: u32,
    /// Consecutive accepted words. The multi-party flow never resets it.
    pub streak: u32,
    /// Only the host may pause or resume the room.
    pub is_host: bool,
}

impl Player {
    /// A fresh player with zero score and streak.
    pub fn new(id: PlayerId, name: impl Into<String>, is_host: bool) -> Self {
        Self {
            id,
            name: name.into(),
            score: 0,
            streak: 0,
            is_host,
        }
    }
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// A point-in-time snapshot of a room, attached to nearly every server event
/// so clients can resynchronize from any single message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub room_code: RoomCode,
    pub game_id: GameId,
    /// Players in turn order.
    pub players: Vec<Player>,
    pub current_word: String,
    /// Every word played so far, sorted. A set internally.
    pub used_words: Vec<String>,
    /// Index into `players` of whoever moves next.
    pub turn_index: usize,
    pub is_paused: bool,
    /// Advisory seconds per turn for client-side timers.
    pub round_time: u32,
    /// Unix milliseconds of the last accepted word, resume, or creation.
    pub last_update: u64,
}

impl GameState {
    /// The player whose turn it is, if the room has anyone in it.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn_index)
    }

    /// Looks up a player by id.
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
        let back: PlayerId = serde_json::from_str("42").unwrap();
        assert_eq!(back, PlayerId(42));
    }

    #[test]
    fn test_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
        assert_eq!(GameId(3).to_string(), "G-3");
    }

    #[test]
    fn test_room_code_normalizes_case_and_whitespace() {
        assert_eq!(RoomCode::new(" ab12cd "), RoomCode::new("AB12CD"));
        assert_eq!(RoomCode::new("ab12cd").as_str(), "AB12CD");
        assert!(RoomCode::new("   ").is_empty());
    }

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomCode::new("QX7K2P")).unwrap();
        assert_eq!(json, "\"QX7K2P\"");
    }

    #[test]
    fn test_new_player_starts_at_zero() {
        let p = Player::new(PlayerId(1), "Ann", true);
        assert_eq!(p.score, 0);
        assert_eq!(p.streak, 0);
        assert!(p.is_host);
    }

    #[test]
    fn test_current_player_follows_turn_index() {
        let state = GameState {
            room_code: RoomCode::new("ABCDEF"),
            game_id: GameId(1),
            players: vec![
                Player::new(PlayerId(1), "Ann", true),
                Player::new(PlayerId(2), "Bob", false),
            ],
            current_word: "tree".into(),
            used_words: vec!["tree".into()],
            turn_index: 1,
            is_paused: false,
            round_time: 30,
            last_update: 0,
        };
        assert_eq!(state.current_player().map(|p| p.name.as_str()), Some("Bob"));
        assert_eq!(state.player(PlayerId(1)).map(|p| p.is_host), Some(true));
        assert!(state.player(PlayerId(9)).is_none());
    }
}
