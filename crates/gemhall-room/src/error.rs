//! Error types for the room layer.

use gemhall_engine::GameError;

/// Errors returned by [`RoomStore`](crate::RoomStore) operations.
///
/// Engine errors pass through unchanged inside [`RoomError::Game`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No room has this id or alias.
    #[error("room not found")]
    RoomNotFound,

    /// All seats are taken.
    #[error("room is full")]
    RoomFull,

    /// Someone in the room already uses this name (case-insensitive).
    #[error("player already in room")]
    PlayerDuplicate,

    /// The caller is not on the room's roster.
    #[error("player not found")]
    PlayerNotFound,

    /// Requested turn timer is outside the accepted bounds.
    #[error("turn seconds must be between {min} and {max}")]
    InvalidTurnSeconds { min: u32, max: u32 },

    /// Player names must contain something besides whitespace.
    #[error("player name is required")]
    InvalidPlayerName,

    /// Only the player who created the room may start it.
    #[error("only host can start")]
    OnlyHostCanStart,

    /// The room is not waiting, or has too few players to start.
    #[error("cannot start game in current room state")]
    InvalidStartState,

    /// Joining is closed once a game starts.
    #[error("game already started")]
    GameAlreadyStarted,

    /// No game is attached yet.
    #[error("game not started")]
    GameNotStarted,

    /// The engine refused the action.
    #[error(transparent)]
    Game(#[from] GameError),
}
