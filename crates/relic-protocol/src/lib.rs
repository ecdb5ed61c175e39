//! Wire protocol for Relic.
//!
//! This crate defines the "language" the game client and server speak:
//!
//! - **Types** ([`Message`], [`ConnectResponse`], [`PlayerSlot`], [`NetId`]):
//!   the messages that travel on the wire.
//! - **Wire format** ([`wire`]): one declarative table of byte layouts,
//!   little-endian, opcode first.
//! - **Versions** ([`ProtocolVersion`]): which identifier width and self
//!   reference a server revision uses.
//! - **Codec** ([`Codec`] trait, [`BinaryCodec`], [`JsonCodec`]): how
//!   messages become bytes and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and session
//! (who's who and whose turn it is). It is pure: no I/O, no state.
//!
//! ```text
//! Transport (bytes) → Protocol (Message) → Session (roster, turn, self)
//! ```

mod codec;
mod error;
mod types;
mod version;
pub mod wire;

pub use codec::{BinaryCodec, Codec};
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ConnectResponse, Direction, Message, NetId, PlayerSlot, SelfRef};
pub use version::{IdWidth, ProtocolVersion, SelfField};
pub use wire::{MAX_CREDENTIAL_LEN, MAX_PLAYERS_IN_GAME};
