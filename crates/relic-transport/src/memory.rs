//! In-memory transport built on tokio channels.
//!
//! Behaves like a message-oriented socket without touching the network,
//! which makes it usable under a paused tokio clock.
//!
//! ```ignore
//! let mut server = MemoryTransport::new();
//! let connector = server.connector();
//! let client = connector.connect().await?;
//! let peer = server.accept().await?;
//! ```

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{mpsc, watch, Mutex};

use crate::{Connection, ConnectionId, Connector, Transport, TransportError};

/// Backlog of dialled-but-not-yet-accepted connections.
const ACCEPT_BACKLOG: usize = 16;

/// Creates two connected ends. Whatever one sends, the other receives.
pub fn pair() -> (MemoryConnection, MemoryConnection) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();
    (MemoryConnection::new(a_tx, b_rx), MemoryConnection::new(b_tx, a_rx))
}

/// Accepting side of the in-memory transport.
pub struct MemoryTransport {
    incoming: mpsc::Receiver<MemoryConnection>,
    dial: mpsc::Sender<MemoryConnection>,
    shut_down: AtomicBool,
}

impl MemoryTransport {
    pub fn new() -> Self {
        let (dial, incoming) = mpsc::channel(ACCEPT_BACKLOG);
        Self {
            incoming,
            dial,
            shut_down: AtomicBool::new(false),
        }
    }

    /// Returns a connector that dials this transport.
    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector {
            dial: self.dial.clone(),
        }
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MemoryTransport {
    type Connection = MemoryConnection;

    async fn accept(&mut self) -> Result<Self::Connection, TransportError> {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(TransportError::Shutdown);
        }
        // The transport holds its own sender, so this only yields `None`
        // if that invariant is broken.
        let conn = self.incoming.recv().await.ok_or(TransportError::Shutdown)?;
        tracing::debug!(id = %conn.id(), "accepted in-memory connection");
        Ok(conn)
    }

    async fn shutdown(&self) -> Result<(), TransportError> {
        self.shut_down.store(true, Ordering::Release);
        Ok(())
    }
}

/// Dials a [`MemoryTransport`].
#[derive(Clone)]
pub struct MemoryConnector {
    dial: mpsc::Sender<MemoryConnection>,
}

impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    async fn connect(&self) -> Result<Self::Connection, TransportError> {
        let (local, remote) = pair();
        self.dial.send(remote).await.map_err(|_| {
            TransportError::ConnectFailed(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "in-memory transport dropped",
            ))
        })?;
        Ok(local)
    }
}

/// One end of an in-memory connection.
pub struct MemoryConnection {
    id: ConnectionId,
    outbound: std::sync::Mutex<Option<mpsc::UnboundedSender<Vec<u8>>>>,
    inbound: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
    closed: watch::Sender<bool>,
}

impl MemoryConnection {
    fn new(
        outbound: mpsc::UnboundedSender<Vec<u8>>,
        inbound: mpsc::UnboundedReceiver<Vec<u8>>,
    ) -> Self {
        Self {
            id: ConnectionId::next(),
            outbound: std::sync::Mutex::new(Some(outbound)),
            inbound: Mutex::new(inbound),
            closed: watch::Sender::new(false),
        }
    }

    fn outbound(&self) -> Option<mpsc::UnboundedSender<Vec<u8>>> {
        match self.outbound.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Connection for MemoryConnection {
    async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let tx = self
            .outbound()
            .ok_or_else(|| TransportError::ConnectionClosed("closed locally".into()))?;
        tx.send(data.to_vec())
            .map_err(|_| TransportError::ConnectionClosed("peer dropped".into()))
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut closed = self.closed.subscribe();
        if *closed.borrow_and_update() {
            return Ok(None);
        }
        let mut inbound = self.inbound.lock().await;
        tokio::select! {
            msg = inbound.recv() => Ok(msg),
            _ = closed.wait_for(|c| *c) => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        let taken = match self.outbound.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(taken);
        self.closed.send_replace(true);
        Ok(())
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
