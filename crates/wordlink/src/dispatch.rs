//! Event dispatch: the single entry point every client event goes through.
//!
//! Wraps each event in a `room_event` span, times it, and turns room errors
//! into the failure event the sender should see. Handlers below this layer
//! just return `Result`.

use std::time::Duration;

use tokio::time::Instant;
use tracing::Instrument;
use wordlink_protocol::{ClientEvent, PlayerId, RoomCode, ServerEvent};
use wordlink_room::RoomError;
use wordlink_transport::ConnectionId;

use crate::lifecycle::ConnectionLifecycleManager;

/// Events slower than this are logged as warnings.
pub const SLOW_EVENT_THRESHOLD: Duration = Duration::from_secs(1);

/// Message sent to the client when an internal error occurs.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Runs one client event to completion and delivers any direct reply or
/// failure to `outbound`. Room-wide events are broadcast by the room itself.
///
/// A failure is returned after the sender has been told about it, so the
/// caller only needs it for bookkeeping.
pub async fn dispatch(
    lifecycle: &ConnectionLifecycleManager,
    conn_id: ConnectionId,
    outbound: &wordlink_room::PlayerSender,
    event: ClientEvent,
) -> Result<(), RoomError> {
    let name = event.name();
    let span = tracing::info_span!("room_event", event = name, %conn_id);

    async move {
        let started = Instant::now();
        let payload = format!("{event:?}");

        let result = handle_event(lifecycle, conn_id, outbound, event).await;

        let elapsed = started.elapsed();
        if elapsed > SLOW_EVENT_THRESHOLD {
            tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "slow room event");
        } else {
            tracing::debug!(elapsed_us = elapsed.as_micros() as u64, "room event handled");
        }

        match result {
            Ok(reply) => {
                if let Some(reply) = reply {
                    let _ = outbound.send(reply);
                }
                Ok(())
            }
            Err(e) => {
                if e.is_internal() {
                    tracing::error!(error = %e, %payload, "room event failed");
                } else {
                    tracing::debug!(reason = %e, "room event rejected");
                }
                if let Some(failure) = failure_event(&e) {
                    let _ = outbound.send(failure);
                }
                Err(e)
            }
        }
    }
    .instrument(span)
    .await
}

/// The event the sender gets for a failed request, if any.
///
/// Word rejections return `None`: the room already broadcast them together
/// with its snapshot.
pub fn failure_event(error: &RoomError) -> Option<ServerEvent> {
    if error.is_word_rejection() {
        return None;
    }
    let message = if error.is_internal() {
        INTERNAL_ERROR_MESSAGE.to_string()
    } else {
        error.to_string()
    };
    Some(ServerEvent::Error { message })
}

async fn handle_event(
    lifecycle: &ConnectionLifecycleManager,
    conn_id: ConnectionId,
    outbound: &wordlink_room::PlayerSender,
    event: ClientEvent,
) -> Result<Option<ServerEvent>, RoomError> {
    match event {
        ClientEvent::CreateRoom { player_name } => {
            let created = lifecycle
                .create(conn_id, &player_name, outbound.clone())
                .await?;
            Ok(Some(ServerEvent::RoomCreated {
                room_code: created.room_code,
                player_id: created.player.id,
                game_state: created.game_state,
            }))
        }

        ClientEvent::JoinRoom {
            room_code,
            player_name,
        } => {
            // The joiner learns its id from the room-wide `player_joined`.
            lifecycle
                .join(conn_id, &room_code, &player_name, outbound.clone())
                .await?;
            Ok(None)
        }

        ClientEvent::SubmitWord {
            room_code,
            player_id,
            word,
        } => {
            let (room_code, player_id) = require(&room_code, player_id, "Invalid submission")?;
            if !lifecycle.is_bound_to(conn_id, &room_code, player_id).await {
                tracing::warn!(%room_code, %player_id, "submission as another player");
                return Err(RoomError::PlayerNotFound(player_id));
            }
            lifecycle
                .registry()
                .submit_word(&room_code, player_id, &word)
                .await?;
            Ok(None)
        }

        ClientEvent::TogglePause {
            room_code,
            player_id,
            is_paused,
        } => {
            let (room_code, player_id) = require(&room_code, player_id, "Invalid request")?;
            if !lifecycle.is_bound_to(conn_id, &room_code, player_id).await {
                tracing::warn!(%room_code, %player_id, "pause request as another player");
                return Err(RoomError::NotHost(player_id));
            }
            lifecycle
                .registry()
                .set_paused(&room_code, player_id, is_paused)
                .await?;
            Ok(None)
        }
    }
}

/// Both addressing fields must be present.
fn require(
    room_code: &str,
    player_id: Option<PlayerId>,
    message: &str,
) -> Result<(RoomCode, PlayerId), RoomError> {
    let room_code = RoomCode::new(room_code);
    match player_id {
        Some(player_id) if !room_code.is_empty() => Ok((room_code, player_id)),
        _ => Err(RoomError::Validation(message.to_string())),
    }
}
