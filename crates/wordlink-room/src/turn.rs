//! Turn coordination: the submit-word and pause protocols for one room.
//!
//! These functions take `&mut RoomState` and are only ever called from the
//! room's actor, so each call is already exclusive. Every check runs before
//! the single commit block; an `Err` means the room is untouched.

use wordlink_protocol::{Player, PlayerId};

use crate::{RoomError, RoomState, words};

/// Largest streak bonus a single word can earn.
pub const MAX_STREAK_BONUS: u32 = 4;

/// The result of a committed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedWord {
    pub word: String,
    pub previous_word: String,
    pub points: u32,
    pub bonus_points: u32,
    /// The scorer after the update.
    pub player: Player,
    /// The player who now holds the turn.
    pub next_player: Player,
}

/// Points for the `streak`-th consecutive accepted word (1-based).
pub fn points_for_streak(streak: u32) -> (u32, u32) {
    let bonus = streak.saturating_sub(1).min(MAX_STREAK_BONUS);
    (1 + bonus, bonus)
}

/// Runs the submit-word protocol against a room.
///
/// The word is trimmed and lower-cased first. Rejections, in order: paused,
/// unknown player, not the turn holder, already used, unrelated to the
/// current word. The multi-party flow never resets a streak on rejection.
pub fn submit_word(
    room: &mut RoomState,
    player_id: PlayerId,
    word: &str,
) -> Result<AcceptedWord, RoomError> {
    let word = word.trim().to_lowercase();
    if word.is_empty() {
        return Err(RoomError::Validation("Invalid submission".into()));
    }
    if room.is_paused {
        return Err(RoomError::Paused);
    }
    if room.player(player_id).is_none() {
        return Err(RoomError::PlayerNotFound(player_id));
    }
    match room.current_player() {
        Some(holder) if holder.id == player_id => {}
        _ => return Err(RoomError::NotYourTurn(player_id)),
    }
    if room.has_used(&word) {
        return Err(RoomError::DuplicateWord(word));
    }
    let current = room.current_word.to_lowercase();
    if !words::related(&current, &word) {
        return Err(RoomError::UnrelatedWord { word, current });
    }

    // Commit. Nothing below can fail.
    let player = room
        .player_mut(player_id)
        .ok_or(RoomError::PlayerNotFound(player_id))?;
    player.streak += 1;
    let (points, bonus_points) = points_for_streak(player.streak);
    player.score += points;
    let player = player.clone();

    room.used_words.insert(word.clone());
    room.current_word = word.clone();
    room.touch();
    room.turn_index = (room.turn_index + 1) % room.players.len();

    let next_player = room
        .current_player()
        .cloned()
        .ok_or_else(|| RoomError::Internal("turn holder vanished after commit".into()))?;

    Ok(AcceptedWord {
        word,
        previous_word: current,
        points,
        bonus_points,
        player,
        next_player,
    })
}

/// Sets the paused flag. Host only; resuming refreshes the activity clock.
///
/// Returns the name of the host who made the change.
pub fn set_paused(
    room: &mut RoomState,
    player_id: PlayerId,
    paused: bool,
) -> Result<String, RoomError> {
    let player = room
        .player(player_id)
        .ok_or(RoomError::NotHost(player_id))?;
    if !player.is_host {
        return Err(RoomError::NotHost(player_id));
    }
    let name = player.name.clone();

    room.is_paused = paused;
    if !paused {
        room.touch();
    }
    Ok(name)
}
