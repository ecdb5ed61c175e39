//! Error types for the protocol layer.
//!
//! Each crate in Relic defines its own error enum. A `ProtocolError` always
//! means the bytes (or the message being turned into bytes) were wrong, never
//! that the network misbehaved.

/// Errors that can occur while encoding or decoding a message.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The buffer is too short for the layout its opcode declares.
    ///
    /// `opcode` is `None` when there weren't even two bytes to read the
    /// opcode from. Always recoverable: the caller drops the message and
    /// keeps going.
    #[error("malformed message (opcode {opcode:?}): need {needed} bytes, got {available}")]
    Malformed {
        opcode: Option<u16>,
        needed: usize,
        available: usize,
    },

    /// The message can't be represented in the active wire format: a name
    /// that's too long, an identifier that doesn't fit the width, a
    /// self reference of the wrong kind, and so on.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// JSON serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// JSON deserialization failed.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}

impl ProtocolError {
    /// Whether this is the "too short" case.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}
