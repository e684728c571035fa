//! JSON messages exchanged over a game connection.
//!
//! Every message is an object tagged by `type`:
//!
//! ```json
//! {"type": "join_room", "roomId": "tiger", "playerName": "Bob"}
//! {"type": "room_snapshot", "reason": "player_joined", "room": {...}}
//! ```

use gemhall_engine::Seat;
use gemhall_protocol::{ActionRequest, PlayerId};
use gemhall_room::{Room, RoomError};
use serde::{Deserialize, Serialize};

/// Sent by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Open a room and take its first seat.
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        host_name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        turn_seconds: Option<u32>,
    },

    /// Take a seat in a waiting room. `room_id` may be the id or the alias.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: String, player_name: String },

    /// Resume an existing seat on this connection.
    #[serde(rename_all = "camelCase")]
    Attach { room_id: String, player_id: PlayerId },

    StartGame,

    /// One in-game move.
    Action { action: ActionRequest },

    GetRoom,

    Ping,

    /// Detach and close the connection.
    Leave,
}

/// Sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms which seat this connection now speaks for.
    Welcome { room: Room, player: Seat },

    /// The room changed, or the client asked for it.
    RoomSnapshot { reason: SnapshotReason, room: Room },

    /// The last request was refused. Nothing changed.
    ActionError { code: ErrorCode, error: String },

    Pong,
}

/// Why a room snapshot was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotReason {
    PlayerJoined,
    GameStarted,
    ActionApplied,
    PlayerConnected,
    PlayerDisconnected,
    TurnTimeout,
    /// Reply to `get_room`; only the asking connection receives it.
    Requested,
}

/// Machine-readable refusal reasons carried by `action_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    RoomNotFound,
    RoomFull,
    PlayerDuplicate,
    PlayerNotFound,
    InvalidTurnSeconds,
    InvalidPlayerName,
    OnlyHostCanStart,
    InvalidRoomState,
    InvalidAction,
    NotAttached,
    BadMessage,
}

impl From<&RoomError> for ErrorCode {
    fn from(err: &RoomError) -> Self {
        match err {
            RoomError::RoomNotFound => Self::RoomNotFound,
            RoomError::RoomFull => Self::RoomFull,
            RoomError::PlayerDuplicate => Self::PlayerDuplicate,
            RoomError::PlayerNotFound => Self::PlayerNotFound,
            RoomError::InvalidTurnSeconds { .. } => Self::InvalidTurnSeconds,
            RoomError::InvalidPlayerName => Self::InvalidPlayerName,
            RoomError::OnlyHostCanStart => Self::OnlyHostCanStart,
            RoomError::InvalidStartState
            | RoomError::GameAlreadyStarted
            | RoomError::GameNotStarted => Self::InvalidRoomState,
            RoomError::Game(_) => Self::InvalidAction,
        }
    }
}

#[cfg(test)]
mod tests {
    use gemhall_engine::GameError;

    use super::*;

    #[test]
    fn test_client_message_decodes_camel_case_fields() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"create_room","hostName":"Alice","turnSeconds":45}"#)
                .unwrap();
        assert_eq!(
            msg,
            ClientMessage::CreateRoom {
                host_name: "Alice".into(),
                turn_seconds: Some(45),
            }
        );
    }

    #[test]
    fn test_client_message_turn_seconds_optional() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"create_room","hostName":"Alice"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::CreateRoom { turn_seconds: None, .. }));
    }

    #[test]
    fn test_client_message_action_carries_request() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"action","action":{"type":"take_tokens","payload":{"colors":["red"]}}}"#,
        )
        .unwrap();
        let ClientMessage::Action { action } = msg else {
            panic!("expected action");
        };
        assert_eq!(action.kind, "take_tokens");
        assert_eq!(action.payload.colors, vec!["red".to_string()]);
    }

    #[test]
    fn test_client_message_rejects_unknown_type() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"dance"}"#).is_err());
    }

    #[test]
    fn test_server_message_error_shape() {
        let msg = ServerMessage::ActionError {
            code: ErrorCode::InvalidRoomState,
            error: "game not started".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "action_error");
        assert_eq!(json["code"], "invalid_room_state");
        assert_eq!(json["error"], "game not started");
    }

    #[test]
    fn test_server_message_pong_is_bare() {
        assert_eq!(serde_json::to_string(&ServerMessage::Pong).unwrap(), r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_error_code_from_room_error() {
        assert_eq!(ErrorCode::from(&RoomError::RoomFull), ErrorCode::RoomFull);
        assert_eq!(
            ErrorCode::from(&RoomError::GameAlreadyStarted),
            ErrorCode::InvalidRoomState
        );
        assert_eq!(
            ErrorCode::from(&RoomError::Game(GameError::NotPlayerTurn)),
            ErrorCode::InvalidAction
        );
    }
}
