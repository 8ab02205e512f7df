//! Room actor: one Tokio task per room, owning that room's [`RoomState`].
//!
//! Every operation on a room is a command in the actor's mailbox, processed
//! to completion before the next one starts. That is the only exclusion a
//! room needs; nothing else ever touches its state.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use wordlink_protocol::{GameState, Player, PlayerId, RoomCode, ServerEvent};

use crate::audit::{AuditLog, WordRecord};
use crate::turn::{self, AcceptedWord};
use crate::{RoomError, RoomState};

/// Channel for delivering server events to one player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerEvent>;

/// What a leave produced.
#[derive(Debug, Clone)]
pub struct Departure {
    /// The player as they were when they left.
    pub player: Player,
    /// The room after the removal.
    pub game_state: GameState,
}

impl Departure {
    /// The room has nobody left and its actor has stopped.
    pub fn room_emptied(&self) -> bool {
        self.game_state.players.is_empty()
    }
}

/// Commands sent to a room actor.
pub(crate) enum RoomCommand {
    Join {
        player: Player,
        sender: PlayerSender,
        reply: oneshot::Sender<GameState>,
    },

    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<Departure, RoomError>>,
    },

    Submit {
        player_id: PlayerId,
        word: String,
        reply: oneshot::Sender<Result<AcceptedWord, RoomError>>,
    },

    SetPaused {
        player_id: PlayerId,
        paused: bool,
        reply: oneshot::Sender<Result<GameState, RoomError>>,
    },

    Snapshot {
        reply: oneshot::Sender<GameState>,
    },

    /// Stop the actor if the room is stale at `now`. Replies `true` if it
    /// stopped.
    EvictIfStale {
        now: Instant,
        threshold: Duration,
        reply: oneshot::Sender<bool>,
    },

    Shutdown,
}

/// Handle to a running room actor. Cheap to clone.
///
/// Once the actor has stopped, every method returns
/// [`RoomError::RoomNotFound`].
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_code(&self) -> &RoomCode {
        &self.room_code
    }

    /// Whether both handles drive the same actor. Codes are reused once a
    /// room is gone, so equal codes do not imply the same room.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    /// Adds `player` at the end of the turn order. Every member, the new one
    /// included, receives `player_joined`.
    pub async fn join(
        &self,
        player: Player,
        sender: PlayerSender,
    ) -> Result<GameState, RoomError> {
        self.request(|reply| RoomCommand::Join {
            player,
            sender,
            reply,
        })
        .await
    }

    /// Removes a player. Remaining members receive `player_left`; if nobody
    /// remains the actor stops.
    pub async fn leave(&self, player_id: PlayerId) -> Result<Departure, RoomError> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await?
    }

    /// Runs the submit-word protocol. Accepted words and word rejections are
    /// broadcast to the room; every other error is for the caller alone.
    pub async fn submit_word(
        &self,
        player_id: PlayerId,
        word: impl Into<String>,
    ) -> Result<AcceptedWord, RoomError> {
        let word = word.into();
        self.request(|reply| RoomCommand::Submit {
            player_id,
            word,
            reply,
        })
        .await?
    }

    /// Host-only pause or resume, broadcast as `game_paused`.
    pub async fn set_paused(
        &self,
        player_id: PlayerId,
        paused: bool,
    ) -> Result<GameState, RoomError> {
        self.request(|reply| RoomCommand::SetPaused {
            player_id,
            paused,
            reply,
        })
        .await?
    }

    pub async fn snapshot(&self) -> Result<GameState, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    /// Asks the room to stop if it is stale. The decision is made inside
    /// the actor, so it is ordered with every other command.
    pub async fn evict_if_stale(
        &self,
        now: Instant,
        threshold: Duration,
    ) -> Result<bool, RoomError> {
        self.request(|reply| RoomCommand::EvictIfStale {
            now,
            threshold,
            reply,
        })
        .await
    }

    /// Tells the room to stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::RoomNotFound(self.room_code.clone()))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::RoomNotFound(self.room_code.clone()))?;
        // A dropped reply means the actor stopped with our command queued.
        reply_rx
            .await
            .map_err(|_| RoomError::RoomNotFound(self.room_code.clone()))
    }
}

/// Whether the actor loop keeps going after a command.
enum Flow {
    Continue,
    Stop,
}

struct RoomActor {
    state: RoomState,
    senders: HashMap<PlayerId, PlayerSender>,
    audit: AuditLog,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        let room_code = self.state.room_code().clone();
        tracing::info!(%room_code, game_id = %self.state.game_id(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            if let Flow::Stop = self.handle(cmd) {
                break;
            }
        }

        tracing::info!(%room_code, "room actor stopped");
    }

    fn handle(&mut self, cmd: RoomCommand) -> Flow {
        match cmd {
            RoomCommand::Join {
                player,
                sender,
                reply,
            } => {
                let _ = reply.send(self.handle_join(player, sender));
                Flow::Continue
            }
            RoomCommand::Leave { player_id, reply } => {
                let result = self.handle_leave(player_id);
                let emptied = matches!(&result, Ok(d) if d.room_emptied());
                let _ = reply.send(result);
                if emptied { Flow::Stop } else { Flow::Continue }
            }
            RoomCommand::Submit {
                player_id,
                word,
                reply,
            } => {
                let _ = reply.send(self.handle_submit(player_id, &word));
                Flow::Continue
            }
            RoomCommand::SetPaused {
                player_id,
                paused,
                reply,
            } => {
                let _ = reply.send(self.handle_set_paused(player_id, paused));
                Flow::Continue
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.state.snapshot());
                Flow::Continue
            }
            RoomCommand::EvictIfStale {
                now,
                threshold,
                reply,
            } => {
                let stale = self.state.is_stale(now, threshold);
                let _ = reply.send(stale);
                if stale {
                    tracing::info!(
                        room_code = %self.state.room_code(),
                        players = self.state.players().len(),
                        "evicting stale room"
                    );
                    Flow::Stop
                } else {
                    Flow::Continue
                }
            }
            RoomCommand::Shutdown => {
                tracing::info!(room_code = %self.state.room_code(), "room shutting down");
                Flow::Stop
            }
        }
    }

    fn handle_join(&mut self, player: Player, sender: PlayerSender) -> GameState {
        tracing::info!(
            room_code = %self.state.room_code(),
            player_id = %player.id,
            player_name = %player.name,
            players = self.state.players().len() + 1,
            "player joined"
        );
        self.senders.insert(player.id, sender);
        self.state.add_player(player.clone());

        let game_state = self.state.snapshot();
        self.broadcast(ServerEvent::PlayerJoined {
            room_code: self.state.room_code().clone(),
            player,
            game_state: game_state.clone(),
        });
        game_state
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<Departure, RoomError> {
        let player = self
            .state
            .remove_player(player_id)
            .ok_or(RoomError::PlayerNotFound(player_id))?;
        self.senders.remove(&player_id);

        tracing::info!(
            room_code = %self.state.room_code(),
            %player_id,
            players = self.state.players().len(),
            "player left"
        );

        let game_state = self.state.snapshot();
        if !game_state.players.is_empty() {
            self.broadcast(ServerEvent::PlayerLeft {
                player: player.clone(),
                game_state: game_state.clone(),
            });
        }
        Ok(Departure { player, game_state })
    }

    fn handle_submit(
        &mut self,
        player_id: PlayerId,
        word: &str,
    ) -> Result<AcceptedWord, RoomError> {
        match turn::submit_word(&mut self.state, player_id, word) {
            Ok(accepted) => {
                let game_state = self.state.snapshot();
                tracing::info!(
                    room_code = %self.state.room_code(),
                    %player_id,
                    word = %accepted.word,
                    points = accepted.points,
                    "word accepted"
                );
                self.audit.record(WordRecord {
                    game_id: self.state.game_id(),
                    word: accepted.word.clone(),
                    previous_word: accepted.previous_word.clone(),
                    points: accepted.points,
                    player_id,
                    timestamp: game_state.last_update,
                });
                self.broadcast(ServerEvent::WordAccepted {
                    word: accepted.word.clone(),
                    points: accepted.points,
                    bonus_points: accepted.bonus_points,
                    player: accepted.player.clone(),
                    game_state,
                    next_player: accepted.next_player.name.clone(),
                });
                Ok(accepted)
            }
            Err(e) if e.is_word_rejection() => {
                tracing::debug!(
                    room_code = %self.state.room_code(),
                    %player_id,
                    reason = %e,
                    "word rejected"
                );
                self.broadcast(ServerEvent::WordRejected {
                    message: e.to_string(),
                    game_state: self.state.snapshot(),
                });
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn handle_set_paused(
        &mut self,
        player_id: PlayerId,
        paused: bool,
    ) -> Result<GameState, RoomError> {
        let player_name = turn::set_paused(&mut self.state, player_id, paused)?;
        tracing::info!(
            room_code = %self.state.room_code(),
            %player_id,
            paused,
            "pause toggled"
        );
        let game_state = self.state.snapshot();
        self.broadcast(ServerEvent::GamePaused {
            game_state: game_state.clone(),
            is_paused: paused,
            player_name,
        });
        Ok(game_state)
    }

    /// Sends an event to every member. A member whose connection is gone is
    /// skipped; its disconnect will arrive as a `Leave`.
    fn broadcast(&self, event: ServerEvent) {
        for player in self.state.players() {
            if let Some(sender) = self.senders.get(&player.id) {
                let _ = sender.send(event.clone());
            }
        }
    }
}

/// Spawns an actor owning `state`, whose only player is the host holding
/// `host_sender`.
pub(crate) fn spawn_room(
    state: RoomState,
    host_sender: PlayerSender,
    audit: AuditLog,
    mailbox_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(mailbox_size.max(1));
    let room_code = state.room_code().clone();

    let mut senders = HashMap::new();
    if let Some(host) = state.players().first() {
        senders.insert(host.id, host_sender);
    }

    let actor = RoomActor {
        state,
        senders,
        audit,
        receiver: rx,
    };
    tokio::spawn(actor.run());

    RoomHandle {
        room_code,
        sender: tx,
    }
}

#[cfg(test)]
mod tests {
    use wordlink_protocol::GameId;

    use super::*;
    use crate::audit::MemoryAuditSink;

    fn spawn_with_host() -> (RoomHandle, mpsc::UnboundedReceiver<ServerEvent>) {
        let state = RoomState::new(
            RoomCode::new("ROOM01"),
            GameId(1),
            Player::new(PlayerId(1), "Ann", true),
            "tree",
            30,
        );
        let (tx, rx) = mpsc::unbounded_channel();
        (spawn_room(state, tx, AuditLog::disabled(), 8), rx)
    }

    #[tokio::test]
    async fn test_join_broadcasts_to_everyone() {
        let (room, mut ann_rx) = spawn_with_host();
        let (bob_tx, mut bob_rx) = mpsc::unbounded_channel();

        let snapshot = room
            .join(Player::new(PlayerId(2), "Bob", false), bob_tx)
            .await
            .unwrap();

        assert_eq!(snapshot.players.len(), 2);
        for rx in [&mut ann_rx, &mut bob_rx] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.name(), "player_joined");
        }
    }

    #[tokio::test]
    async fn test_rejection_broadcast_with_snapshot() {
        let (room, mut ann_rx) = spawn_with_host();

        let err = room.submit_word(PlayerId(1), "tree").await.unwrap_err();

        assert_eq!(err, RoomError::DuplicateWord("tree".into()));
        match ann_rx.recv().await.unwrap() {
            ServerEvent::WordRejected {
                message,
                game_state,
            } => {
                assert_eq!(message, "Word already used");
                assert_eq!(game_state.current_word, "tree");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_turn_violation_is_not_broadcast() {
        let (room, mut ann_rx) = spawn_with_host();
        let (bob_tx, _bob_rx) = mpsc::unbounded_channel();
        room.join(Player::new(PlayerId(2), "Bob", false), bob_tx)
            .await
            .unwrap();
        let _joined = ann_rx.recv().await.unwrap();

        let err = room.submit_word(PlayerId(2), "leaf").await.unwrap_err();

        assert_eq!(err, RoomError::NotYourTurn(PlayerId(2)));
        assert!(ann_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_accepted_word_is_audited() {
        let sink = MemoryAuditSink::new();
        let (audit, writer) = AuditLog::spawn(sink.clone());
        let state = RoomState::new(
            RoomCode::new("ROOM02"),
            GameId(7),
            Player::new(PlayerId(1), "Ann", true),
            "tree",
            30,
        );
        let (tx, _rx) = mpsc::unbounded_channel();
        let room = spawn_room(state, tx, audit, 8);

        room.submit_word(PlayerId(1), "leaf").await.unwrap();
        room.shutdown().await.unwrap();
        drop(room);
        writer.await.unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].game_id, GameId(7));
        assert_eq!(records[0].previous_word, "tree");
        assert_eq!(records[0].word, "leaf");
    }

    #[tokio::test]
    async fn test_last_leave_stops_the_actor() {
        let (room, _rx) = spawn_with_host();

        let departure = room.leave(PlayerId(1)).await.unwrap();

        assert!(departure.room_emptied());
        assert_eq!(
            room.snapshot().await.unwrap_err(),
            RoomError::RoomNotFound(RoomCode::new("ROOM01"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_if_stale_only_when_stale() {
        let (room, _rx) = spawn_with_host();
        let threshold = Duration::from_secs(60);

        assert!(!room.evict_if_stale(Instant::now(), threshold).await.unwrap());

        tokio::time::advance(Duration::from_secs(61)).await;
        assert!(room.evict_if_stale(Instant::now(), threshold).await.unwrap());
        assert!(room.snapshot().await.is_err());
    }

    #[tokio::test]
    async fn test_same_room_compares_actors_not_codes() {
        let (first, _first_rx) = spawn_with_host();
        let (second, _second_rx) = spawn_with_host();

        assert_eq!(first.room_code(), second.room_code());
        assert!(first.same_room(&first.clone()));
        assert!(!first.same_room(&second));
    }
}
