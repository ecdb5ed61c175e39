//! Heartbeat and reconnect timing for Relic.
//!
//! - [`HeartbeatScheduler`]: a fixed-interval keepalive timer. The client
//!   sends a `Ping` each time it fires.
//! - [`Backoff`]: delays between reconnect attempts, exponential with
//!   jitter and a retry cap.
//!
//! Both are plain state machines over `tokio::time`, so they behave
//! deterministically under a paused test clock.
//!
//! # Integration
//!
//! The heartbeat sits inside the client driver's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         inbound = link.recv() => { /* dispatch */ }
//!         beat = heartbeat.wait_for_beat() => { link.send(&Message::Ping).await?; }
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!     }
//! }
//! ```

mod backoff;
mod heartbeat;

pub use backoff::{Backoff, ReconnectPolicy};
pub use heartbeat::{BeatInfo, HeartbeatConfig, HeartbeatScheduler, MissedBeatPolicy};
