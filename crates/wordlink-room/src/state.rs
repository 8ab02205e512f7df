//! The in-memory aggregate for one room.

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::time::Instant;
use wordlink_protocol::{GameId, GameState, Player, PlayerId, RoomCode};

/// Everything one room knows. Owned exclusively by its room actor.
///
/// Invariants kept by every method here:
/// - `turn_index < players.len()` while `players` is non-empty, 0 otherwise;
/// - `current_word` is always in `used_words`;
/// - `used_words` never shrinks;
/// - exactly one host while `players` is non-empty.
#[derive(Debug, Clone)]
pub struct RoomState {
    pub(crate) room_code: RoomCode,
    pub(crate) game_id: GameId,
    pub(crate) players: Vec<Player>,
    pub(crate) current_word: String,
    pub(crate) used_words: BTreeSet<String>,
    pub(crate) turn_index: usize,
    pub(crate) is_paused: bool,
    pub(crate) round_time: u32,
    /// Monotonic; drives staleness. Tokio's clock so tests can advance it.
    pub(crate) last_update: Instant,
    /// Wall-clock twin of `last_update`, unix milliseconds, for snapshots.
    pub(crate) last_update_ms: u64,
}

impl RoomState {
    /// A fresh room with `host` as its only player.
    pub fn new(
        room_code: RoomCode,
        game_id: GameId,
        host: Player,
        start_word: &str,
        round_time: u32,
    ) -> Self {
        let start_word = start_word.to_lowercase();
        let mut used_words = BTreeSet::new();
        used_words.insert(start_word.clone());
        Self {
            room_code,
            game_id,
            players: vec![host],
            current_word: start_word,
            used_words,
            turn_index: 0,
            is_paused: false,
            round_time,
            last_update: Instant::now(),
            last_update_ms: unix_millis_now(),
        }
    }

    pub fn room_code(&self) -> &RoomCode {
        &self.room_code
    }

    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_word(&self) -> &str {
        &self.current_word
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn last_update(&self) -> Instant {
        self.last_update
    }

    pub fn has_used(&self, word: &str) -> bool {
        self.used_words.contains(word)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// The player who holds the turn.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn_index)
    }

    /// Appends a non-host player at the end of the turn order.
    pub(crate) fn add_player(&mut self, player: Player) {
        self.players.push(player);
    }

    /// Removes a player, keeping the turn index and host invariants.
    ///
    /// If the index falls off the end it wraps to the first remaining
    /// player rather than tracking the previous holder. If the host leaves,
    /// the earliest-joined remaining player becomes host.
    pub(crate) fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        let pos = self.players.iter().position(|p| p.id == id)?;
        let removed = self.players.remove(pos);

        if self.turn_index >= self.players.len() {
            self.turn_index = 0;
        }
        if removed.is_host {
            if let Some(next) = self.players.first_mut() {
                next.is_host = true;
                tracing::info!(
                    room_code = %self.room_code,
                    new_host = %next.id,
                    "host left, promoted next player"
                );
            }
        }
        Some(removed)
    }

    /// Marks the room as active now.
    pub(crate) fn touch(&mut self) {
        self.last_update = Instant::now();
        self.last_update_ms = unix_millis_now();
    }

    /// Whether the health monitor should evict this room.
    pub fn is_stale(&self, now: Instant, threshold: std::time::Duration) -> bool {
        self.players.is_empty() || now.saturating_duration_since(self.last_update) > threshold
    }

    /// The wire snapshot of this room.
    pub fn snapshot(&self) -> GameState {
        GameState {
            room_code: self.room_code.clone(),
            game_id: self.game_id,
            players: self.players.clone(),
            current_word: self.current_word.clone(),
            used_words: self.used_words.iter().cloned().collect(),
            turn_index: self.turn_index,
            is_paused: self.is_paused,
            round_time: self.round_time,
            last_update: self.last_update_ms,
        }
    }
}

fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn room_with(names: &[&str]) -> RoomState {
        let mut room = RoomState::new(
            RoomCode::new("ABCDEF"),
            GameId(1),
            Player::new(PlayerId(1), names[0], true),
            "Tree",
            30,
        );
        for (i, name) in names.iter().enumerate().skip(1) {
            room.add_player(Player::new(PlayerId(i as u64 + 1), *name, false));
        }
        room
    }

    #[test]
    fn test_new_room_invariants() {
        let room = room_with(&["Ann"]);
        assert_eq!(room.current_word(), "tree");
        assert!(room.has_used("tree"));
        assert_eq!(room.turn_index(), 0);
        assert_eq!(room.players().iter().filter(|p| p.is_host).count(), 1);
        assert!(!room.is_paused());
    }

    #[test]
    fn test_remove_player_resets_out_of_range_turn() {
        let mut room = room_with(&["Ann", "Bob", "Cy"]);
        room.turn_index = 2;

        room.remove_player(PlayerId(3)).expect("Cy is in the room");

        assert_eq!(room.turn_index(), 0);
    }

    #[test]
    fn test_remove_player_keeps_in_range_turn() {
        let mut room = room_with(&["Ann", "Bob", "Cy"]);
        room.turn_index = 1;

        room.remove_player(PlayerId(3)).unwrap();

        assert_eq!(room.turn_index(), 1);
        assert_eq!(room.current_player().map(|p| p.name.as_str()), Some("Bob"));
    }

    #[test]
    fn test_remove_host_promotes_next_player() {
        let mut room = room_with(&["Ann", "Bob", "Cy"]);

        let removed = room.remove_player(PlayerId(1)).unwrap();

        assert!(removed.is_host);
        let hosts: Vec<_> = room.players().iter().filter(|p| p.is_host).collect();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].name, "Bob");
    }

    #[test]
    fn test_remove_last_player_leaves_empty_room() {
        let mut room = room_with(&["Ann"]);
        room.remove_player(PlayerId(1)).unwrap();
        assert!(room.players().is_empty());
        assert_eq!(room.turn_index(), 0);
        assert!(room.remove_player(PlayerId(1)).is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_staleness_uses_threshold_and_emptiness() {
        let mut room = room_with(&["Ann"]);
        let threshold = Duration::from_secs(3600);
        assert!(!room.is_stale(Instant::now(), threshold));

        tokio::time::advance(Duration::from_secs(3601)).await;
        assert!(room.is_stale(Instant::now(), threshold));

        room.touch();
        assert!(!room.is_stale(Instant::now(), threshold));

        room.remove_player(PlayerId(1));
        assert!(room.is_stale(Instant::now(), threshold));
    }

    #[test]
    fn test_snapshot_sorts_used_words() {
        let mut room = room_with(&["Ann", "Bob"]);
        room.used_words.insert("leaf".into());
        room.used_words.insert("bush".into());

        let snap = room.snapshot();

        assert_eq!(snap.used_words, vec!["bush", "leaf", "tree"]);
        assert_eq!(snap.players.len(), 2);
        assert_eq!(snap.round_time, 30);
        assert!(snap.last_update > 0);
    }
}
