//! Protocol session for Relic.
//!
//! Everything the client knows about the game it has joined: which player
//! it is, who else is connected and where they stand, whose turn it is.
//! [`Session`] applies decoded messages to that state and reports what
//! changed as [`SessionEvent`]s.
//!
//! # How it fits in the stack
//!
//! ```text
//! Client runtime (above)  ← owns one Session per connection, forwards events
//!     ↕
//! Session Layer (this crate)  ← lifecycle, roster, self identity, turn
//!     ↕
//! Protocol Layer (below)  ← provides Message, NetId, ProtocolVersion
//! ```
//!
//! The session does no I/O. It is driven entirely by the caller, which
//! makes every transition testable without a socket.

mod error;
mod roster;
mod session;

pub use error::SessionError;
pub use roster::{Roster, RosterInsert};
pub use session::{Session, SessionEvent, SessionState};
