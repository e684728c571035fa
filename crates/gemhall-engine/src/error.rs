//! Error types for the rules engine.

/// Why the engine refused to create a game or apply an action.
///
/// Every variant is recoverable: the engine state is untouched whenever
/// one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A game needs between two and four seats.
    #[error("invalid player count: {0}")]
    InvalidPlayerCount(usize),

    /// The caller is not the current player.
    #[error("not player's turn")]
    NotPlayerTurn,

    /// The game already ended.
    #[error("game already finished")]
    GameFinished,

    /// The action type is not one the engine knows.
    #[error("unknown action: {0}")]
    UnknownAction(String),

    /// The action is known but illegal in the current position.
    #[error("invalid action: {0}")]
    InvalidAction(String),
}

impl GameError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidAction(reason.into())
    }
}
