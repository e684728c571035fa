//! Room lifecycle management for Gemhall.
//!
//! A room gathers up to four players, then hosts one match. Every room sits
//! behind its own `RwLock`, so actions in different rooms never wait on each
//! other. The store's index lock is only held long enough to find or insert
//! a room.
//!
//! # Key types
//!
//! - [`RoomStore`]: creates rooms, routes joins/starts/actions, sweeps
//!   expired turn timers
//! - [`Room`]: serializable room snapshot, game state included
//! - [`RoomStatus`]: lifecycle state machine
//! - [`RoomConfig`]: player limits and turn timer bounds
//! - [`TimeoutUpdate`]: one room changed by a timeout sweep

mod codes;
mod config;
mod error;
mod room;
mod store;

pub use config::{RoomConfig, RoomStatus};
pub use error::RoomError;
pub use room::{Room, TimeoutUpdate};
pub use store::RoomStore;
