//! Rules engine for Gemhall.
//!
//! One [`GameEngine`] owns the full board of one match: bank, three tiers
//! of face-up cards with their hidden decks, the noble row, and every
//! player's holdings. It is a plain synchronous state machine with no
//! locking of its own. The room store wraps each engine in a per-room lock
//! and only ever hands out [`GameState`] snapshots.
//!
//! # Key types
//!
//! - [`GameEngine`]: applies [`Action`]s and enforces turn order
//! - [`Action`]: the closed set of moves, parsed from an
//!   [`ActionRequest`](gemhall_protocol::ActionRequest)
//! - [`TokenSet`] / [`Gem`]: token counts per gem kind
//! - [`Card`] / [`Noble`]: immutable catalog entries
//! - [`GameError`]: every way an action can be refused

mod action;
mod catalog;
mod engine;
mod error;
mod state;
mod tokens;

pub use action::{Action, CardSource};
pub use catalog::{Card, Noble, cards, nobles};
pub use engine::{GameEngine, HAND_LIMIT, MAX_RESERVED, WINNING_POINTS};
pub use error::GameError;
pub use state::{GameState, GameStatus, PlayerState, Seat};
pub use tokens::{Gem, TokenSet};
