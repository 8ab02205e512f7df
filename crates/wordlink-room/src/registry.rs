//! Room registry: creates rooms, finds them by code, and removes them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tokio::time::Instant;
use wordlink_protocol::{GameId, GameState, Player, PlayerId, RoomCode};

use crate::audit::AuditLog;
use crate::room::{Departure, PlayerSender, RoomHandle, spawn_room};
use crate::turn::AcceptedWord;
use crate::{RoomConfig, RoomError, RoomState, code, words};

/// Result of creating a room: the sender becomes its host.
#[derive(Debug, Clone)]
pub struct CreatedRoom {
    pub room_code: RoomCode,
    pub player: Player,
    pub game_state: GameState,
}

/// Result of joining a room.
#[derive(Debug, Clone)]
pub struct JoinedRoom {
    pub room_code: RoomCode,
    pub player: Player,
    pub game_state: GameState,
}

/// All active rooms, keyed by code.
///
/// The map lock covers code allocation plus insertion, and removal. It is
/// never held while awaiting a room actor; callers clone the handle out and
/// release the lock first.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomCode, RoomHandle>>,
    config: RoomConfig,
    audit: AuditLog,
    next_player_id: AtomicU64,
    next_game_id: AtomicU64,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self::with_audit(config, AuditLog::disabled())
    }

    /// A registry whose rooms report accepted words to `audit`.
    pub fn with_audit(config: RoomConfig, audit: AuditLog) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            config,
            audit,
            next_player_id: AtomicU64::new(1),
            next_game_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Opens a room with `host_name` as its only player and host.
    pub async fn create_room(
        &self,
        host_name: &str,
        sender: PlayerSender,
    ) -> Result<CreatedRoom, RoomError> {
        let host_name = host_name.trim();
        if host_name.is_empty() {
            return Err(RoomError::Validation("Player name is required".into()));
        }

        let player = Player::new(self.next_player_id(), host_name, true);
        let game_id = GameId(self.next_game_id.fetch_add(1, Ordering::Relaxed));
        let start_word = words::random_start_word(&mut rand::rng());

        let mut rooms = self.rooms.lock().await;
        let room_code = code::allocate(&mut rand::rng(), self.config.code_length, |c| {
            rooms.contains_key(c)
        });
        let state = RoomState::new(
            room_code.clone(),
            game_id,
            player.clone(),
            start_word,
            self.config.round_time_secs,
        );
        let game_state = state.snapshot();
        let handle = spawn_room(state, sender, self.audit.clone(), self.config.mailbox_size);
        rooms.insert(room_code.clone(), handle);
        drop(rooms);

        tracing::info!(
            %room_code,
            %game_id,
            host = %player.id,
            %start_word,
            "room created"
        );
        Ok(CreatedRoom {
            room_code,
            player,
            game_state,
        })
    }

    /// Adds a non-host player to an existing room. The code is matched
    /// case-insensitively.
    pub async fn join_room(
        &self,
        room_code: &str,
        player_name: &str,
        sender: PlayerSender,
    ) -> Result<JoinedRoom, RoomError> {
        let room_code = RoomCode::new(room_code);
        let player_name = player_name.trim();
        if room_code.is_empty() || player_name.is_empty() {
            return Err(RoomError::Validation(
                "Room code and player name are required".into(),
            ));
        }

        let handle = self.handle(&room_code).await?;
        let player = Player::new(self.next_player_id(), player_name, false);
        let game_state = handle.join(player.clone(), sender).await?;
        Ok(JoinedRoom {
            room_code,
            player,
            game_state,
        })
    }

    /// Removes a player from a room, deleting the room if it is now empty.
    pub async fn leave(
        &self,
        room_code: &RoomCode,
        player_id: PlayerId,
    ) -> Result<Departure, RoomError> {
        let handle = self.handle(room_code).await?;
        let departure = handle.leave(player_id).await?;
        if departure.room_emptied() && self.forget(&handle).await {
            tracing::info!(%room_code, "room emptied, removed");
        }
        Ok(departure)
    }

    pub async fn submit_word(
        &self,
        room_code: &RoomCode,
        player_id: PlayerId,
        word: &str,
    ) -> Result<AcceptedWord, RoomError> {
        self.handle(room_code)
            .await?
            .submit_word(player_id, word)
            .await
    }

    pub async fn set_paused(
        &self,
        room_code: &RoomCode,
        player_id: PlayerId,
        paused: bool,
    ) -> Result<GameState, RoomError> {
        self.handle(room_code)
            .await?
            .set_paused(player_id, paused)
            .await
    }

    /// A snapshot of one room.
    pub async fn get(&self, room_code: &RoomCode) -> Result<GameState, RoomError> {
        self.handle(room_code).await?.snapshot().await
    }

    pub async fn exists(&self, room_code: &RoomCode) -> bool {
        self.rooms.lock().await.contains_key(room_code)
    }

    /// Deletes a room and stops its actor. Removing an unknown code is a
    /// no-op; returns whether anything was removed.
    pub async fn remove_room(&self, room_code: &RoomCode) -> bool {
        let Some(handle) = self.rooms.lock().await.remove(room_code) else {
            return false;
        };
        let _ = handle.shutdown().await;
        tracing::info!(%room_code, "room removed");
        true
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// Evicts every room that is stale at `now` and returns their codes.
    ///
    /// Each room decides for itself inside its actor, so an eviction is
    /// ordered with any join or submission racing it.
    pub async fn sweep(&self, now: Instant) -> Vec<RoomCode> {
        let handles: Vec<RoomHandle> = self.rooms.lock().await.values().cloned().collect();
        let threshold = self.config.inactivity_threshold;

        let mut evicted = Vec::new();
        for handle in handles {
            match handle.evict_if_stale(now, threshold).await {
                // Already stopped but still listed; drop the entry too.
                Ok(true) | Err(RoomError::RoomNotFound(_)) => {
                    if self.forget(&handle).await {
                        evicted.push(handle.room_code().clone());
                    }
                }
                Ok(false) => {}
                Err(e) => {
                    let room_code = handle.room_code();
                    tracing::warn!(%room_code, error = %e, "sweep check failed");
                }
            }
        }
        evicted
    }

    /// Drops the map entry for `handle`'s room, unless the code has since
    /// been given to a different room.
    async fn forget(&self, handle: &RoomHandle) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get(handle.room_code()) {
            Some(current) if current.same_room(handle) => {
                rooms.remove(handle.room_code());
                true
            }
            _ => false,
        }
    }

    async fn handle(&self, room_code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .lock()
            .await
            .get(room_code)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(room_code.clone()))
    }

    fn next_player_id(&self) -> PlayerId {
        PlayerId(self.next_player_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
