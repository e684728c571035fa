//! Room configuration and lifecycle state.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RoomError;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Player limits and turn timer bounds shared by every room in a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Minimum players required to start the game.
    pub min_players: usize,

    /// Maximum players allowed in the room.
    pub max_players: usize,

    /// Turn timer used when the host does not pick one.
    pub default_turn_seconds: u32,

    pub min_turn_seconds: u32,
    pub max_turn_seconds: u32,
}

impl RoomConfig {
    /// Maps a requested turn timer to the one a room will use.
    ///
    /// `None` and `Some(0)` mean "use the default".
    ///
    /// # Errors
    /// `InvalidTurnSeconds` when the value falls outside the bounds.
    pub fn resolve_turn_seconds(&self, requested: Option<u32>) -> Result<u32, RoomError> {
        match requested {
            None | Some(0) => Ok(self.default_turn_seconds),
            Some(secs) if (self.min_turn_seconds..=self.max_turn_seconds).contains(&secs) => {
                Ok(secs)
            }
            Some(_) => Err(RoomError::InvalidTurnSeconds {
                min: self.min_turn_seconds,
                max: self.max_turn_seconds,
            }),
        }
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 4,
            default_turn_seconds: 30,
            min_turn_seconds: 5,
            max_turn_seconds: 300,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// Waiting → Playing → Finished
/// ```
///
/// - **Waiting**: the host is gathering players; joins are accepted.
/// - **Playing**: a game is attached and accepts actions.
/// - **Finished**: the game ended; the room stays readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if a game is running.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Playing)
    }

    /// The only state this one may move to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Waiting => Some(Self::Playing),
            Self::Playing => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "waiting"),
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_status_next_follows_strict_order() {
        assert_eq!(RoomStatus::Waiting.next(), Some(RoomStatus::Playing));
        assert_eq!(RoomStatus::Playing.next(), Some(RoomStatus::Finished));
        assert_eq!(RoomStatus::Finished.next(), None);
    }

    #[test]
    fn test_room_status_can_transition_to() {
        assert!(RoomStatus::Waiting.can_transition_to(RoomStatus::Playing));
        assert!(!RoomStatus::Waiting.can_transition_to(RoomStatus::Finished));
        assert!(!RoomStatus::Finished.can_transition_to(RoomStatus::Waiting));
    }

    #[test]
    fn test_room_status_is_joinable_only_while_waiting() {
        assert!(RoomStatus::Waiting.is_joinable());
        assert!(!RoomStatus::Playing.is_joinable());
        assert!(!RoomStatus::Finished.is_joinable());
    }

    #[test]
    fn test_room_status_serializes_lowercase() {
        let json = serde_json::to_string(&RoomStatus::Playing).unwrap();
        assert_eq!(json, "\"playing\"");
    }

    #[test]
    fn test_resolve_turn_seconds_defaults() {
        let cfg = RoomConfig::default();
        assert_eq!(cfg.resolve_turn_seconds(None), Ok(30));
        assert_eq!(cfg.resolve_turn_seconds(Some(0)), Ok(30));
    }

    #[test]
    fn test_resolve_turn_seconds_bounds() {
        let cfg = RoomConfig::default();
        assert_eq!(cfg.resolve_turn_seconds(Some(5)), Ok(5));
        assert_eq!(cfg.resolve_turn_seconds(Some(300)), Ok(300));
        assert_eq!(
            cfg.resolve_turn_seconds(Some(4)),
            Err(RoomError::InvalidTurnSeconds { min: 5, max: 300 })
        );
        assert!(cfg.resolve_turn_seconds(Some(301)).is_err());
    }
}
