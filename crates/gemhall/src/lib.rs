//! # Gemhall
//!
//! Real-time server for a gem trading card game played by two to four
//! players over WebSockets.
//!
//! Clients create or join a room, the host starts the match, and every
//! accepted move is broadcast as a full room snapshot to everyone watching
//! the room, whether they subscribed by its id or its mnemonic alias. A
//! background sweeper passes for players who let their turn timer run out.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gemhall::prelude::*;
//!
//! # async fn run() -> Result<(), GemhallError> {
//! let server = GemhallServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod messages;
mod server;
mod timeouts;

pub use error::GemhallError;
pub use messages::{ClientMessage, ErrorCode, ServerMessage, SnapshotReason};
pub use server::{DEFAULT_IDLE_TIMEOUT, GemhallServer, GemhallServerBuilder};

/// Everything needed to run a server or talk to one in tests.
pub mod prelude {
    pub use crate::{
        ClientMessage, ErrorCode, GemhallError, GemhallServer, GemhallServerBuilder,
        ServerMessage, SnapshotReason,
    };
    pub use gemhall_engine::{GameState, GameStatus, Gem, PlayerState, Seat, TokenSet};
    pub use gemhall_protocol::{ActionRequest, PlayerId, RoomCode, RoomId};
    pub use gemhall_room::{Room, RoomConfig, RoomError, RoomStatus, RoomStore};
    pub use gemhall_tick::{Clock, ManualClock, SystemClock, TickConfig};
}
