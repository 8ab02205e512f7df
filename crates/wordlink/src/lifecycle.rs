//! Connection lifecycle: which connection is which player in which room.
//!
//! A connection is bound to at most one `(room, player)` pair. Creating or
//! joining binds it; a disconnect looks the binding up and removes the
//! player from that room, which deletes the room if it empties.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use wordlink_protocol::{PlayerId, RoomCode};
use wordlink_room::{CreatedRoom, Departure, JoinedRoom, PlayerSender, RoomError, RoomRegistry};
use wordlink_transport::ConnectionId;

/// The room membership held by one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub room_code: RoomCode,
    pub player_id: PlayerId,
}

/// Maps connections to room memberships and cleans up after them.
pub struct ConnectionLifecycleManager {
    registry: Arc<RoomRegistry>,
    bindings: Mutex<HashMap<ConnectionId, Binding>>,
}

impl ConnectionLifecycleManager {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self {
            registry,
            bindings: Mutex::new(HashMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Creates a room hosted by this connection.
    pub async fn create(
        &self,
        conn_id: ConnectionId,
        player_name: &str,
        sender: PlayerSender,
    ) -> Result<CreatedRoom, RoomError> {
        let created = self.registry.create_room(player_name, sender).await?;
        self.rebind(
            conn_id,
            Binding {
                room_code: created.room_code.clone(),
                player_id: created.player.id,
            },
        )
        .await;
        Ok(created)
    }

    /// Joins an existing room as this connection.
    pub async fn join(
        &self,
        conn_id: ConnectionId,
        room_code: &str,
        player_name: &str,
        sender: PlayerSender,
    ) -> Result<JoinedRoom, RoomError> {
        let joined = self
            .registry
            .join_room(room_code, player_name, sender)
            .await?;
        self.rebind(
            conn_id,
            Binding {
                room_code: joined.room_code.clone(),
                player_id: joined.player.id,
            },
        )
        .await;
        Ok(joined)
    }

    /// Removes the connection's player from its room, if it has one.
    ///
    /// Returns what the room saw. `None` if the connection was never bound
    /// or its room is already gone.
    pub async fn disconnect(&self, conn_id: ConnectionId) -> Option<Departure> {
        let binding = self.bindings.lock().await.remove(&conn_id)?;
        self.leave(conn_id, binding).await
    }

    /// The current binding of a connection.
    pub async fn binding(&self, conn_id: ConnectionId) -> Option<Binding> {
        self.bindings.lock().await.get(&conn_id).cloned()
    }

    /// Whether this connection is `player_id` in `room_code`. A request
    /// may only act as the player its own connection created or joined as.
    pub async fn is_bound_to(
        &self,
        conn_id: ConnectionId,
        room_code: &RoomCode,
        player_id: PlayerId,
    ) -> bool {
        self.bindings
            .lock()
            .await
            .get(&conn_id)
            .is_some_and(|b| b.room_code == *room_code && b.player_id == player_id)
    }

    /// Number of connections currently in a room.
    pub async fn bound_count(&self) -> usize {
        self.bindings.lock().await.len()
    }

    /// Records a new binding. A connection that was already in a room
    /// leaves it once the new membership exists.
    async fn rebind(&self, conn_id: ConnectionId, binding: Binding) {
        let previous = self.bindings.lock().await.insert(conn_id, binding);
        if let Some(previous) = previous {
            tracing::info!(
                %conn_id,
                room_code = %previous.room_code,
                "connection switched rooms, leaving previous"
            );
            self.leave(conn_id, previous).await;
        }
    }

    async fn leave(&self, conn_id: ConnectionId, binding: Binding) -> Option<Departure> {
        match self
            .registry
            .leave(&binding.room_code, binding.player_id)
            .await
        {
            Ok(departure) => {
                tracing::info!(
                    %conn_id,
                    room_code = %binding.room_code,
                    player_id = %binding.player_id,
                    remaining = departure.game_state.players.len(),
                    "player disconnected"
                );
                Some(departure)
            }
            // Evicted or already emptied; nothing left to clean up.
            Err(e @ (RoomError::RoomNotFound(_) | RoomError::PlayerNotFound(_))) => {
                tracing::debug!(
                    %conn_id,
                    room_code = %binding.room_code,
                    error = %e,
                    "binding pointed at a room that is gone"
                );
                None
            }
            Err(e) => {
                tracing::error!(
                    %conn_id,
                    room_code = %binding.room_code,
                    player_id = %binding.player_id,
                    error = %e,
                    "failed to remove disconnected player"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;
    use wordlink_protocol::ServerEvent;

    use super::*;

    fn manager() -> ConnectionLifecycleManager {
        ConnectionLifecycleManager::new(Arc::new(RoomRegistry::default()))
    }

    fn channel() -> (PlayerSender, mpsc::UnboundedReceiver<ServerEvent>) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn test_create_binds_connection() {
        let lifecycle = manager();
        let conn = ConnectionId::new(1);

        let created = lifecycle.create(conn, "Ann", channel().0).await.unwrap();

        assert_eq!(
            lifecycle.binding(conn).await,
            Some(Binding {
                room_code: created.room_code,
                player_id: created.player.id,
            })
        );
    }

    #[tokio::test]
    async fn test_failed_join_leaves_no_binding() {
        let lifecycle = manager();
        let conn = ConnectionId::new(1);

        let err = lifecycle
            .join(conn, "NOPE00", "Bob", channel().0)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Room not found");
        assert!(lifecycle.binding(conn).await.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_notifies_remaining_players() {
        let lifecycle = manager();
        let (ann_tx, mut ann_rx) = channel();
        let created = lifecycle
            .create(ConnectionId::new(1), "Ann", ann_tx)
            .await
            .unwrap();
        lifecycle
            .join(ConnectionId::new(2), created.room_code.as_str(), "Bob", channel().0)
            .await
            .unwrap();
        let _joined = ann_rx.recv().await.unwrap();

        let departure = lifecycle.disconnect(ConnectionId::new(2)).await.unwrap();

        assert_eq!(departure.player.name, "Bob");
        assert_eq!(ann_rx.recv().await.unwrap().name(), "player_left");
        assert!(lifecycle.binding(ConnectionId::new(2)).await.is_none());
    }

    #[tokio::test]
    async fn test_last_disconnect_deletes_room() {
        let lifecycle = manager();
        let conn = ConnectionId::new(1);
        let created = lifecycle.create(conn, "Ann", channel().0).await.unwrap();

        let departure = lifecycle.disconnect(conn).await.unwrap();

        assert!(departure.room_emptied());
        assert!(!lifecycle.registry().exists(&created.room_code).await);
    }

    #[tokio::test]
    async fn test_disconnect_of_unbound_connection_is_noop() {
        let lifecycle = manager();
        assert!(lifecycle.disconnect(ConnectionId::new(9)).await.is_none());
    }

    #[tokio::test]
    async fn test_switching_rooms_leaves_the_previous_one() {
        let lifecycle = manager();
        let conn = ConnectionId::new(1);
        let first = lifecycle.create(conn, "Ann", channel().0).await.unwrap();

        let second = lifecycle.create(conn, "Ann", channel().0).await.unwrap();

        assert_eq!(lifecycle.bound_count().await, 1);
        assert_eq!(
            lifecycle.binding(conn).await.map(|b| b.room_code),
            Some(second.room_code)
        );
        // Ann was alone in the first room, so it is gone.
        assert!(!lifecycle.registry().exists(&first.room_code).await);
    }

    #[tokio::test]
    async fn test_is_bound_to_matches_room_and_player() {
        let lifecycle = manager();
        let ann = ConnectionId::new(1);
        let bob = ConnectionId::new(2);
        let created = lifecycle.create(ann, "Ann", channel().0).await.unwrap();
        let joined = lifecycle
            .join(bob, created.room_code.as_str(), "Bob", channel().0)
            .await
            .unwrap();
        let code = &created.room_code;

        assert!(lifecycle.is_bound_to(ann, code, created.player.id).await);
        assert!(lifecycle.is_bound_to(bob, code, joined.player.id).await);
        assert!(!lifecycle.is_bound_to(bob, code, created.player.id).await);
        assert!(!lifecycle.is_bound_to(ConnectionId::new(3), code, created.player.id).await);
        assert!(!lifecycle.is_bound_to(ann, &RoomCode::new("OTHER1"), created.player.id).await);
    }
}
