//! Client requests and server events.
//!
//! Both directions use the same adjacently tagged JSON shape:
//!
//! ```text
//! { "event": "submit_word", "data": { "room_code": "QX7K2P", "player_id": 3, "word": "leaf" } }
//! ```
//!
//! Request fields default to empty/absent instead of failing to decode, so a
//! missing `player_name` reaches the room layer and comes back as a readable
//! validation error rather than a generic decode failure.

use serde::{Deserialize, Serialize};

use crate::{GameState, Player, PlayerId, RoomCode};

/// Requests a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Open a new room with the sender as host.
    CreateRoom {
        #[serde(default)]
        player_name: String,
    },

    /// Join an existing room by code.
    JoinRoom {
        #[serde(default)]
        room_code: String,
        #[serde(default)]
        player_name: String,
    },

    /// Play a word on the sender's turn.
    SubmitWord {
        #[serde(default)]
        room_code: String,
        #[serde(default)]
        player_id: Option<PlayerId>,
        #[serde(default)]
        word: String,
    },

    /// Host-only: set the paused flag.
    TogglePause {
        #[serde(default)]
        room_code: String,
        #[serde(default)]
        player_id: Option<PlayerId>,
        #[serde(default)]
        is_paused: bool,
    },
}

impl ClientEvent {
    /// The wire name of the event, for logs and spans.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "create_room",
            Self::JoinRoom { .. } => "join_room",
            Self::SubmitWord { .. } => "submit_word",
            Self::TogglePause { .. } => "toggle_pause",
        }
    }
}

/// Events the server emits, either to the sender or to a whole room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Sent once right after the connection is accepted.
    ConnectResponse { message: String },

    /// Sender only: the room exists and the sender is its host.
    RoomCreated {
        room_code: RoomCode,
        player_id: PlayerId,
        game_state: GameState,
    },

    /// Room-wide: someone joined. The joiner learns its id from `player`.
    PlayerJoined {
        room_code: RoomCode,
        player: Player,
        game_state: GameState,
    },

    /// Room-wide: a word was accepted and the turn advanced.
    WordAccepted {
        word: String,
        points: u32,
        bonus_points: u32,
        /// The scoring player after the update.
        player: Player,
        game_state: GameState,
        /// Name of the player who moves next.
        next_player: String,
    },

    /// Room-wide: the word was a duplicate or unrelated. State is unchanged.
    WordRejected { message: String, game_state: GameState },

    /// Room-wide: the host paused or resumed.
    GamePaused {
        game_state: GameState,
        is_paused: bool,
        player_name: String,
    },

    /// Room-wide: a player's connection went away.
    PlayerLeft { player: Player, game_state: GameState },

    /// Sender only: the request failed.
    Error { message: String },
}

impl ServerEvent {
    /// The wire name of the event, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConnectResponse { .. } => "connect_response",
            Self::RoomCreated { .. } => "room_created",
            Self::PlayerJoined { .. } => "player_joined",
            Self::WordAccepted { .. } => "word_accepted",
            Self::WordRejected { .. } => "word_rejected",
            Self::GamePaused { .. } => "game_paused",
            Self::PlayerLeft { .. } => "player_left",
            Self::Error { .. } => "error",
        }
    }

    /// The snapshot carried by this event, if any.
    pub fn game_state(&self) -> Option<&GameState> {
        match self {
            Self::RoomCreated { game_state, .. }
            | Self::PlayerJoined { game_state, .. }
            | Self::WordAccepted { game_state, .. }
            | Self::WordRejected { game_state, .. }
            | Self::GamePaused { game_state, .. }
            | Self::PlayerLeft { game_state, .. } => Some(game_state),
            Self::ConnectResponse { .. } | Self::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    //! The JSON shapes here are what browser clients parse, so each test
    //! pins the exact field names rather than round-tripping blindly.

    use super::*;
    use crate::GameId;

    fn snapshot() -> GameState {
        GameState {
            room_code: RoomCode::new("QX7K2P"),
            game_id: GameId(9),
            players: vec![Player::new(PlayerId(1), "Ann", true)],
            current_word: "tree".into(),
            used_words: vec!["tree".into()],
            turn_index: 0,
            is_paused: false,
            round_time: 30,
            last_update: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_create_room_decodes_from_wire_shape() {
        let json = r#"{"event":"create_room","data":{"player_name":"Ann"}}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::CreateRoom {
                player_name: "Ann".into()
            }
        );
        assert_eq!(event.name(), "create_room");
    }

    #[test]
    fn test_missing_fields_default_instead_of_failing() {
        let json = r#"{"event":"submit_word","data":{"room_code":"QX7K2P"}}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::SubmitWord {
                room_code: "QX7K2P".into(),
                player_id: None,
                word: String::new(),
            }
        );
    }

    #[test]
    fn test_toggle_pause_decodes_player_id_as_number() {
        let json = r#"{"event":"toggle_pause","data":{"room_code":"QX7K2P","player_id":4,"is_paused":true}}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::TogglePause {
                room_code: "QX7K2P".into(),
                player_id: Some(PlayerId(4)),
                is_paused: true,
            }
        );
    }

    #[test]
    fn test_unknown_event_tag_fails() {
        let json = r#"{"event":"fly_to_moon","data":{}}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_word_accepted_json_format() {
        let event = ServerEvent::WordAccepted {
            word: "leaf".into(),
            points: 2,
            bonus_points: 1,
            player: Player::new(PlayerId(1), "Ann", true),
            game_state: snapshot(),
            next_player: "Bob".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "word_accepted");
        assert_eq!(json["data"]["points"], 2);
        assert_eq!(json["data"]["bonus_points"], 1);
        assert_eq!(json["data"]["next_player"], "Bob");
        assert_eq!(json["data"]["player"]["is_host"], true);
        assert_eq!(json["data"]["game_state"]["room_code"], "QX7K2P");
        assert_eq!(
            json["data"]["game_state"]["used_words"],
            serde_json::json!(["tree"])
        );
    }

    #[test]
    fn test_error_json_format() {
        let event = ServerEvent::Error {
            message: "Room not found".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["data"]["message"], "Room not found");
        assert!(event.game_state().is_none());
    }

    #[test]
    fn test_game_state_accessor_covers_room_events() {
        let event = ServerEvent::PlayerLeft {
            player: Player::new(PlayerId(2), "Bob", false),
            game_state: snapshot(),
        };
        assert_eq!(event.name(), "player_left");
        assert_eq!(event.game_state().map(|s| s.game_id), Some(GameId(9)));
    }
}
