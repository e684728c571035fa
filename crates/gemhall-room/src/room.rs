//! Room records and the snapshots handed to callers.

use chrono::{DateTime, TimeDelta, Utc};
use gemhall_engine::{GameEngine, GameState, Seat};
use gemhall_protocol::{PlayerId, RoomCode, RoomId};
use serde::{Deserialize, Serialize};

use crate::RoomStatus;

/// Serializable view of a room, including the game once it has started.
///
/// Every field is owned, so a `Room` stays valid after the room's lock is
/// released and the room moves on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub code: RoomCode,
    pub host_id: PlayerId,
    pub status: RoomStatus,
    /// Roster in turn order.
    pub players: Vec<Seat>,
    pub turn_seconds: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// When the current player's turn expires. Only set while playing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game: Option<GameState>,
}

impl Room {
    /// Looks up a roster entry.
    pub fn seat(&self, player_id: &PlayerId) -> Option<&Seat> {
        self.players.iter().find(|s| &s.id == player_id)
    }
}

/// One room whose turn timer expired during a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeoutUpdate {
    /// Snapshot taken after the forced pass.
    pub room: Room,
    pub timed_out_player: PlayerId,
}

// ---------------------------------------------------------------------------
// RoomEntry
// ---------------------------------------------------------------------------

/// Mutable room record kept behind the room's own lock.
#[derive(Debug)]
pub(crate) struct RoomEntry {
    pub(crate) id: RoomId,
    pub(crate) code: RoomCode,
    pub(crate) host_id: PlayerId,
    pub(crate) status: RoomStatus,
    pub(crate) players: Vec<Seat>,
    pub(crate) turn_seconds: u32,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) started_at: Option<DateTime<Utc>>,
    pub(crate) finished_at: Option<DateTime<Utc>>,
    pub(crate) turn_deadline: Option<DateTime<Utc>>,
    pub(crate) engine: Option<GameEngine>,
}

impl RoomEntry {
    pub(crate) fn new(
        id: RoomId,
        code: RoomCode,
        host: Seat,
        turn_seconds: u32,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            code,
            host_id: host.id.clone(),
            status: RoomStatus::Waiting,
            players: vec![host],
            turn_seconds,
            created_at: now,
            started_at: None,
            finished_at: None,
            turn_deadline: None,
            engine: None,
        }
    }

    pub(crate) fn snapshot(&self) -> Room {
        Room {
            id: self.id.clone(),
            code: self.code.clone(),
            host_id: self.host_id.clone(),
            status: self.status,
            players: self.players.clone(),
            turn_seconds: self.turn_seconds,
            created_at: self.created_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            turn_deadline: self.turn_deadline,
            game: self.engine.as_ref().map(GameEngine::snapshot),
        }
    }

    pub(crate) fn has_player(&self, player_id: &PlayerId) -> bool {
        self.players.iter().any(|s| &s.id == player_id)
    }

    /// Whether `name` matches an existing player, ignoring case and
    /// surrounding whitespace.
    pub(crate) fn has_name(&self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        self.players
            .iter()
            .any(|s| s.name.trim().to_lowercase() == name)
    }

    pub(crate) fn deadline_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + TimeDelta::seconds(i64::from(self.turn_seconds))
    }

    /// Bookkeeping after the engine ended a turn: either restart the turn
    /// timer or close the room if the game is over.
    pub(crate) fn after_turn(&mut self, now: DateTime<Utc>) {
        let finished = self.engine.as_ref().is_some_and(GameEngine::is_finished);
        if finished {
            if self.status.can_transition_to(RoomStatus::Finished) {
                self.status = RoomStatus::Finished;
                self.finished_at = Some(now);
            }
            self.turn_deadline = None;
            let winners = self
                .engine
                .as_ref()
                .map(|e| e.state().winner_ids.len())
                .unwrap_or_default();
            tracing::info!(room_id = %self.id, winners, "game finished");
        } else {
            self.turn_deadline = Some(self.deadline_from(now));
        }
    }

    /// Whether the sweeper should pass for the current player.
    pub(crate) fn turn_expired(&self, now: DateTime<Utc>) -> bool {
        self.status.is_active() && self.turn_deadline.is_some_and(|deadline| deadline <= now)
    }
}
