//! Wire-level vocabulary for Gemhall.
//!
//! This crate defines what clients and the server agree on before any
//! game rules come into play:
//!
//! - **Identifiers** ([`PlayerId`], [`RoomId`], [`RoomCode`]): opaque strings that
//!   travel unchanged through every layer.
//! - **Action payload** ([`ActionRequest`], [`ActionPayload`]): the loose
//!   `{type, payload}` shape a client sends to act in a game. The engine
//!   turns it into a closed enum; this crate only carries it.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (JSON values) → Room store (rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ActionPayload, ActionRequest, PlayerId, RoomCode, RoomId};
