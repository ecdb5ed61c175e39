//! Error types for the session layer.

use crate::SessionState;

/// Errors returned by [`Session`](crate::Session) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The operation needs an active session (first roster received).
    #[error("session is not active (state: {0})")]
    NotActive(SessionState),

    /// The session was closed. A closed session is never reopened; the
    /// caller starts a fresh one instead.
    #[error("session has been closed")]
    Terminated,
}
