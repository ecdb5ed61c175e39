//! Unified error type for the Relic client.

use relic_protocol::ProtocolError;
use relic_session::SessionError;
use relic_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attributes let `?` lift sub-crate errors into this one.
#[derive(Debug, thiserror::Error)]
pub enum RelicError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (not active, terminated).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// No transport connection is open.
    #[error("not connected")]
    NotConnected,

    /// The client task has exited.
    #[error("client stopped")]
    ClientStopped,
}
