//! One transport connection plus the codec that frames it.

use relic_protocol::{BinaryCodec, Codec, Direction, Message, ProtocolError, ProtocolVersion};
use relic_transport::{Connection, ConnectionId};

use crate::RelicError;

/// What [`Link::recv`] produced.
#[derive(Debug)]
pub enum Inbound {
    /// A decoded server message.
    Message(Message),
    /// Bytes that did not decode. The message is lost, the link is fine.
    Malformed(ProtocolError),
    /// The server closed the connection.
    Closed,
}

/// The client's end of a connection to the game server.
///
/// A link is either open (holding a transport connection) or not. There
/// is no outbound queue: sending on a link that isn't open fails.
pub struct Link<C> {
    codec: BinaryCodec,
    conn: Option<C>,
}

impl<C: Connection> Link<C> {
    /// A link that is not open yet.
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            codec: BinaryCodec::new(version),
            conn: None,
        }
    }

    /// Takes ownership of a freshly opened connection.
    pub fn attach(&mut self, conn: C) {
        tracing::debug!(conn_id = %conn.id(), "link attached");
        self.conn = Some(conn);
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn conn_id(&self) -> Option<ConnectionId> {
        self.conn.as_ref().map(Connection::id)
    }

    pub fn version(&self) -> ProtocolVersion {
        self.codec.version()
    }

    /// Encodes and writes one message.
    ///
    /// # Errors
    /// [`RelicError::NotConnected`] if the link is not open, otherwise any
    /// encode or transport failure.
    pub async fn send(&self, message: &Message) -> Result<(), RelicError> {
        let conn = self.conn.as_ref().ok_or(RelicError::NotConnected)?;
        let bytes = self.codec.encode(message)?;
        conn.send(&bytes).await?;
        tracing::trace!(conn_id = %conn.id(), kind = message.kind(), len = bytes.len(), "sent");
        Ok(())
    }

    /// Reads and decodes the next message.
    ///
    /// Cancel-safe as long as the underlying connection's `recv` is.
    pub async fn recv(&self) -> Result<Inbound, RelicError> {
        let conn = self.conn.as_ref().ok_or(RelicError::NotConnected)?;
        let Some(bytes) = conn.recv().await? else {
            return Ok(Inbound::Closed);
        };

        match self.codec.decode(Direction::ServerToClient, &bytes) {
            Ok(message) => Ok(Inbound::Message(message)),
            Err(e) => {
                tracing::warn!(conn_id = %conn.id(), error = %e, len = bytes.len(), "malformed message dropped");
                Ok(Inbound::Malformed(e))
            }
        }
    }

    /// Closes and drops the connection. A no-op if the link is not open.
    pub async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err(e) = conn.close().await {
                tracing::debug!(conn_id = %conn.id(), error = %e, "close failed");
            }
        }
    }
}
