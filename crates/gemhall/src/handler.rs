//! Per-connection handler: attach, message routing, and cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. If the handshake URI names a room and player, attach right away
//!   2. Loop: receive a message → call the room store → reply or broadcast,
//!      pinging the peer between messages and dropping it once it goes quiet
//!   3. On exit, the guard marks the player disconnected and tells the room

use std::sync::Arc;

use gemhall_protocol::{ActionRequest, Codec, PlayerId, RoomCode, RoomId};
use gemhall_room::{Room, RoomError};
use gemhall_transport::{Connection, ConnectionId, WebSocketConnection};

use crate::server::ServerState;
use crate::{ClientMessage, ErrorCode, GemhallError, ServerMessage, SnapshotReason};

/// The seat a connection currently speaks for.
#[derive(Debug, Clone)]
struct Attachment {
    room_id: RoomId,
    code: RoomCode,
    player_id: PlayerId,
}

/// Drop guard that detaches the connection when the handler exits.
///
/// Cleanup runs even if the handler panics. `Drop` is synchronous, so the
/// async part is spawned as a fire-and-forget task.
struct ConnectionGuard<C: Codec> {
    conn_id: ConnectionId,
    attachment: Option<Attachment>,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let attachment = self.attachment.take();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.hub.remove_connection(conn_id).await;
            if let Some(attachment) = attachment {
                detach(&state, conn_id, &attachment).await;
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), GemhallError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let mut guard = ConnectionGuard {
        conn_id,
        attachment: None,
        state: Arc::clone(&state),
    };

    if let (Some(room_ref), Some(player_id)) =
        (conn.query_param("roomId"), conn.query_param("playerId"))
    {
        let outcome = on_attach(&conn, &state, &mut guard, room_ref, PlayerId::new(player_id.trim())).await;
        respond(&conn, &state.codec, outcome).await?;
    }

    let mut heartbeat = tokio::time::interval(state.heartbeat_interval());
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    heartbeat.tick().await;

    loop {
        let received = tokio::select! {
            received = conn.recv() => received,
            _ = heartbeat.tick() => {
                if conn.idle_for() >= state.idle_timeout {
                    tracing::info!(%conn_id, "peer stopped answering pings, closing");
                    break;
                }
                if let Err(e) = conn.ping().await {
                    tracing::debug!(%conn_id, error = %e, "ping failed");
                    break;
                }
                continue;
            }
        };
        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "undecodable message");
                send_error(&conn, &state.codec, ErrorCode::BadMessage, "unsupported message type").await?;
                continue;
            }
        };

        let outcome = match msg {
            ClientMessage::CreateRoom {
                host_name,
                turn_seconds,
            } => on_create(&conn, &state, &mut guard, &host_name, turn_seconds).await,
            ClientMessage::JoinRoom {
                room_id,
                player_name,
            } => on_join(&conn, &state, &mut guard, &room_id, &player_name).await,
            ClientMessage::Attach { room_id, player_id } => {
                on_attach(&conn, &state, &mut guard, &room_id, player_id).await
            }
            ClientMessage::StartGame => on_start(&state, &guard).await,
            ClientMessage::Action { action } => on_action(&state, &guard, &action).await,
            ClientMessage::GetRoom => on_get_room(&conn, &state, &guard).await,
            ClientMessage::Ping => send(&conn, &state.codec, &ServerMessage::Pong).await,
            ClientMessage::Leave => {
                tracing::debug!(%conn_id, "client left");
                if let Err(e) = conn.close().await {
                    tracing::debug!(%conn_id, error = %e, "close failed");
                }
                break;
            }
        };
        respond(&conn, &state.codec, outcome).await?;
    }

    // guard drops here → detach fires.
    Ok(())
}

// ---------------------------------------------------------------------------
// Message handlers
// ---------------------------------------------------------------------------

async fn on_create<C: Codec>(
    conn: &Arc<WebSocketConnection>,
    state: &ServerState<C>,
    guard: &mut ConnectionGuard<C>,
    host_name: &str,
    turn_seconds: Option<u32>,
) -> Result<(), GemhallError> {
    let (room, host) = state.store.create_room(host_name, turn_seconds).await?;
    let room = attach(conn, state, guard, &room, host.id.clone()).await?;
    send(conn, &state.codec, &ServerMessage::Welcome { room, player: host }).await
}

async fn on_join<C: Codec>(
    conn: &Arc<WebSocketConnection>,
    state: &ServerState<C>,
    guard: &mut ConnectionGuard<C>,
    room_ref: &str,
    player_name: &str,
) -> Result<(), GemhallError> {
    let (room, seat) = state.store.join_room(room_ref, player_name).await?;
    let room = attach(conn, state, guard, &room, seat.id.clone()).await?;
    send(
        conn,
        &state.codec,
        &ServerMessage::Welcome {
            room: room.clone(),
            player: seat,
        },
    )
    .await?;
    state
        .broadcast_snapshot(&room, SnapshotReason::PlayerJoined)
        .await?;
    Ok(())
}

async fn on_attach<C: Codec>(
    conn: &Arc<WebSocketConnection>,
    state: &ServerState<C>,
    guard: &mut ConnectionGuard<C>,
    room_ref: &str,
    player_id: PlayerId,
) -> Result<(), GemhallError> {
    let room = state.store.get_room(room_ref).await?;
    let seat = room
        .seat(&player_id)
        .cloned()
        .ok_or(RoomError::PlayerNotFound)?;

    let room = attach(conn, state, guard, &room, player_id).await?;
    send(
        conn,
        &state.codec,
        &ServerMessage::Welcome {
            room: room.clone(),
            player: seat,
        },
    )
    .await?;
    state
        .broadcast_snapshot(&room, SnapshotReason::PlayerConnected)
        .await?;
    Ok(())
}

async fn on_start<C: Codec>(
    state: &ServerState<C>,
    guard: &ConnectionGuard<C>,
) -> Result<(), GemhallError> {
    let seat = attached(guard)?;
    let room = state
        .store
        .start_game(seat.room_id.as_str(), &seat.player_id)
        .await?;
    state
        .broadcast_snapshot(&room, SnapshotReason::GameStarted)
        .await?;
    Ok(())
}

async fn on_action<C: Codec>(
    state: &ServerState<C>,
    guard: &ConnectionGuard<C>,
    action: &ActionRequest,
) -> Result<(), GemhallError> {
    let seat = attached(guard)?;
    let room = state
        .store
        .apply_action(seat.room_id.as_str(), &seat.player_id, action)
        .await?;
    state
        .broadcast_snapshot(&room, SnapshotReason::ActionApplied)
        .await?;
    Ok(())
}

async fn on_get_room<C: Codec>(
    conn: &WebSocketConnection,
    state: &ServerState<C>,
    guard: &ConnectionGuard<C>,
) -> Result<(), GemhallError> {
    let seat = attached(guard)?;
    let room = state.store.get_room(seat.room_id.as_str()).await?;
    send(
        conn,
        &state.codec,
        &ServerMessage::RoomSnapshot {
            reason: SnapshotReason::Requested,
            room,
        },
    )
    .await
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

fn attached<C: Codec>(guard: &ConnectionGuard<C>) -> Result<&Attachment, GemhallError> {
    guard.attachment.as_ref().ok_or(GemhallError::NotAttached)
}

/// Binds this connection to `player_id` in `room`: subscribes it to the
/// room's id and alias and marks the player connected. A previous seat on
/// the same connection is released first.
///
/// Returns the room as it is after the player was marked connected.
async fn attach<C: Codec>(
    conn: &Arc<WebSocketConnection>,
    state: &ServerState<C>,
    guard: &mut ConnectionGuard<C>,
    room: &Room,
    player_id: PlayerId,
) -> Result<Room, GemhallError> {
    if let Some(previous) = guard.attachment.take() {
        detach(state, guard.conn_id, &previous).await;
    }

    state.hub.add(room.id.as_str(), Arc::clone(conn)).await;
    state.hub.add(room.code.as_str(), Arc::clone(conn)).await;
    let room = state
        .store
        .set_connected(room.id.as_str(), &player_id, true)
        .await?;

    tracing::info!(conn_id = %guard.conn_id, room_id = %room.id, player = %player_id, "player attached");
    guard.attachment = Some(Attachment {
        room_id: room.id.clone(),
        code: room.code.clone(),
        player_id,
    });
    Ok(room)
}

/// Unsubscribes the connection from a room, marks the player disconnected,
/// and tells whoever is still watching.
async fn detach<C: Codec>(state: &ServerState<C>, conn_id: ConnectionId, attachment: &Attachment) {
    state.hub.remove(attachment.room_id.as_str(), conn_id).await;
    state.hub.remove(attachment.code.as_str(), conn_id).await;

    let room = match state
        .store
        .set_connected(attachment.room_id.as_str(), &attachment.player_id, false)
        .await
    {
        Ok(room) => room,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "detach from missing room");
            return;
        }
    };
    tracing::info!(%conn_id, room_id = %room.id, player = %attachment.player_id, "player detached");

    if let Err(e) = state
        .broadcast_snapshot(&room, SnapshotReason::PlayerDisconnected)
        .await
    {
        tracing::debug!(%conn_id, error = %e, "disconnect broadcast failed");
    }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// Reports a refused request to the client. Errors the client cannot act
/// on are passed up and end the connection.
async fn respond(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    outcome: Result<(), GemhallError>,
) -> Result<(), GemhallError> {
    let Err(err) = outcome else {
        return Ok(());
    };
    match err.client_code() {
        Some(code) => {
            tracing::debug!(conn_id = %conn.id(), ?code, error = %err, "request refused");
            send_error(conn, codec, code, &err.to_string()).await
        }
        None => Err(err),
    }
}

async fn send(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    msg: &ServerMessage,
) -> Result<(), GemhallError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// Sends an `action_error` to the client.
async fn send_error(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    code: ErrorCode,
    message: &str,
) -> Result<(), GemhallError> {
    send(
        conn,
        codec,
        &ServerMessage::ActionError {
            code,
            error: message.to_string(),
        },
    )
    .await
}
