//! Serializable game state.
//!
//! [`GameState`] is both the engine's working state and the snapshot it
//! hands out. All of its fields own their data (`Vec`, `String`, plain
//! counts), so `Clone` is already a full deep copy and a snapshot can never
//! alias engine storage.

use std::fmt;

use gemhall_protocol::PlayerId;
use serde::{Deserialize, Serialize};

use crate::{Card, Noble, TokenSet};

/// One roster entry handed to [`GameEngine::initialize`](crate::GameEngine::initialize).
/// Roster order is turn order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
}

impl Seat {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(id),
            name: name.into(),
        }
    }
}

/// Whether the match still accepts actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Playing,
    Finished,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "playing"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Everything known about one player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub tokens: TokenSet,
    /// One per purchased card of each color. Gold stays zero.
    pub bonuses: TokenSet,
    pub reserved: Vec<Card>,
    pub purchased_count: u32,
    pub points: u32,
    pub nobles: Vec<Noble>,
    pub is_connected: bool,
    /// Wire name of the last action this player completed, or `timeout`.
    pub last_action: String,
}

impl PlayerState {
    pub(crate) fn seated(seat: &Seat) -> Self {
        Self {
            id: seat.id.clone(),
            name: seat.name.clone(),
            tokens: TokenSet::default(),
            bonuses: TokenSet::default(),
            reserved: Vec::new(),
            purchased_count: 0,
            points: 0,
            nobles: Vec::new(),
            is_connected: true,
            last_action: String::new(),
        }
    }
}

/// The full board of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub status: GameStatus,
    pub turn: u32,
    pub current_player_id: PlayerId,
    pub bank: TokenSet,
    pub tier1: Vec<Card>,
    pub tier2: Vec<Card>,
    pub tier3: Vec<Card>,
    pub deck1_count: usize,
    pub deck2_count: usize,
    pub deck3_count: usize,
    pub nobles: Vec<Noble>,
    pub players: Vec<PlayerState>,
    pub winner_ids: Vec<PlayerId>,
    pub final_round: bool,
    pub final_turns_left: u32,
}

impl GameState {
    /// Looks up a player by id.
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// The face-up cards of one tier (1–3).
    pub fn tableau(&self, tier: u8) -> &[Card] {
        match tier {
            1 => &self.tier1,
            2 => &self.tier2,
            _ => &self.tier3,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }
}
