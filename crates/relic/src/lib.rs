//! # Relic
//!
//! Async client for the Relic game server's binary protocol.
//!
//! The client keeps a WebSocket open to the server, sends the handshake
//! and a keepalive ping every three seconds, decodes roster and movement
//! updates, and reports them as [`ClientEvent`]s. Game code asks to move
//! through a [`ClientHandle`]; rendering and input live elsewhere.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use relic::prelude::*;
//!
//! # async fn run() -> Result<(), RelicError> {
//! let mut client = RelicClient::builder()
//!     .url("ws://127.0.0.1:8080")
//!     .build(ProtocolVersion::Compact)
//!     .start();
//!
//! while let Some(event) = client.next_event().await {
//!     if let ClientEvent::Session(SessionEvent::Connected { .. }) = event {
//!         client.request_move(0.5, -0.25).await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod connection;
mod error;

pub use client::{
    ClientConfig, ClientEvent, ClientHandle, RelicClient, RelicClientBuilder, SessionSnapshot,
};
pub use connection::{Inbound, Link};
pub use error::RelicError;

pub use relic_protocol as protocol;
pub use relic_session as session;
pub use relic_tick as tick;
pub use relic_transport as transport;

/// Everything a typical game front end needs.
pub mod prelude {
    pub use crate::{
        ClientConfig, ClientEvent, ClientHandle, RelicClient, RelicClientBuilder, RelicError,
        SessionSnapshot,
    };
    pub use relic_protocol::{Message, NetId, PlayerSlot, ProtocolVersion};
    pub use relic_session::{SessionEvent, SessionState};
    pub use relic_tick::{HeartbeatConfig, MissedBeatPolicy, ReconnectPolicy};
}
