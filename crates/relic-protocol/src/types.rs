//! Core protocol types for Relic's wire format.
//!
//! These are the structures that travel "on the wire" between the game
//! client and the game server. The byte layout of each one lives in
//! [`wire`](crate::wire); this module only describes their shape in memory.

use serde::{Deserialize, Serialize};

use std::fmt;

use crate::wire::MAX_PLAYERS_IN_GAME;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A network identifier for a player (the server calls these "NetIDs").
///
/// Newtype wrapper around `i64` so an identifier can't be mixed up with a
/// slot index or a coordinate. The value is always held as `i64` in memory;
/// how many bytes it takes on the wire depends on the
/// [`ProtocolVersion`](crate::ProtocolVersion) in effect.
///
/// `#[serde(transparent)]` keeps it a plain number in JSON.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NetId(pub i64);

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N-{}", self.0)
    }
}

impl Default for NetId {
    fn default() -> Self {
        Self(0)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which way a message is travelling.
///
/// Two opcodes share a number but not a layout: `MoveCommand` carries an
/// identifier only when the server broadcasts it, and opcode 2 is a
/// one-byte request going up but the full roster coming down. Decoding
/// therefore needs to know the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Sent by the game client, read by the server.
    ClientToServer,
    /// Sent by the server, read by the game client.
    ServerToClient,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientToServer => f.write_str("client->server"),
            Self::ServerToClient => f.write_str("server->client"),
        }
    }
}

// ---------------------------------------------------------------------------
// Roster slot
// ---------------------------------------------------------------------------

/// One entry of the fixed eight-slot roster sent in a `ConnectResponse`.
///
/// Unused slots come over the wire zero-filled (or with the version's
/// sentinel id) and are never treated as live players.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub id: NetId,
    /// Display name, at most 32 bytes of UTF-8 and never containing NUL.
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl PlayerSlot {
    /// Convenience constructor used heavily in tests and the demo server.
    pub fn new(id: NetId, name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            id,
            name: name.into(),
            x,
            y,
        }
    }
}

/// How a `ConnectResponse` tells the receiver which slot is "you".
///
/// Older servers send the index of the receiving player in the roster
/// array; newer ones send its identifier directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfRef {
    /// Index into [`ConnectResponse::roster`].
    Slot(i8),
    /// The receiving player's identifier.
    Id(NetId),
}

/// Server → Client: the full roster plus turn information.
///
/// Sent in answer to every `ConnectRequest` (and multicast to everyone in
/// the game, so clients see it again whenever somebody joins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub roster: [PlayerSlot; MAX_PLAYERS_IN_GAME],
    /// Whose turn it is. The sentinel means the game hasn't started.
    pub current_turn: NetId,
    /// Whether the joined game has already started.
    pub game_ongoing: bool,
    pub self_ref: SelfRef,
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Every message that can travel between client and server.
///
/// The variant determines the leading opcode; see the layout table in
/// [`wire`](crate::wire) for the exact bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    /// Opcode 0. Keepalive; no payload.
    Ping,

    /// Opcode 1. Going up it is a move request with no identifier (the
    /// server knows who sent it). Coming down it is the authoritative
    /// position of `player_id`.
    MoveCommand {
        player_id: Option<NetId>,
        x: f64,
        y: f64,
    },

    /// Opcode 2, client → server. Carries one placeholder byte.
    ConnectRequest,

    /// Opcode 2, server → client.
    ConnectResponse(ConnectResponse),

    /// Any opcode this build doesn't know. Kept rather than rejected so a
    /// newer server can add messages without breaking older clients.
    Unknown { opcode: u16, payload: Vec<u8> },
}

impl Message {
    /// The opcode this message is written with.
    pub fn opcode(&self) -> u16 {
        match self {
            Self::Ping => crate::wire::OPCODE_PING,
            Self::MoveCommand { .. } => crate::wire::OPCODE_MOVE,
            Self::ConnectRequest | Self::ConnectResponse(_) => {
                crate::wire::OPCODE_CONNECT
            }
            Self::Unknown { opcode, .. } => *opcode,
        }
    }

    /// Short name for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Ping => "Ping",
            Self::MoveCommand { .. } => "MoveCommand",
            Self::ConnectRequest => "ConnectRequest",
            Self::ConnectResponse(_) => "ConnectResponse",
            Self::Unknown { .. } => "Unknown",
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
