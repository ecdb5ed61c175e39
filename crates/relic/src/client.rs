//! `RelicClient` builder, the driver task, and the handle that talks to it.
//!
//! One spawned task owns the [`Session`], the [`Link`] and the heartbeat.
//! Everything else reaches it through a [`ClientHandle`]:
//!
//! ```text
//! ClientHandle ──Command──→ driver task ──bytes──→ transport
//!      ↑                        │
//!      └──────ClientEvent───────┘
//! ```
//!
//! Inbound messages are dispatched in the order the transport delivers
//! them, and their events are forwarded in dispatch order.

use std::collections::VecDeque;
use std::time::Duration;

use relic_protocol::{Message, NetId, PlayerSlot, ProtocolVersion};
use relic_session::{Session, SessionEvent, SessionState};
use relic_tick::{Backoff, HeartbeatConfig, HeartbeatScheduler, ReconnectPolicy};
use relic_transport::{Connection, Connector, WebSocketConnector};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::connection::{Inbound, Link};
use crate::RelicError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Client settings. Everything has a default; see [`RelicClientBuilder`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Game server address. Default: `ws://127.0.0.1:8080`.
    pub url: String,
    pub heartbeat: HeartbeatConfig,
    pub reconnect: ReconnectPolicy,
    /// Capacity of the event channel. The driver queues up to as many
    /// again before it stops reading from the server. Default: 256.
    pub event_buffer: usize,
    /// Capacity of the command channel. Default: 32.
    pub command_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8080".to_string(),
            heartbeat: HeartbeatConfig::default(),
            reconnect: ReconnectPolicy::default(),
            event_buffer: 256,
            command_buffer: 32,
        }
    }
}

impl ClientConfig {
    /// Clamp out-of-range values. Channel capacities are at least 1.
    pub fn validated(mut self) -> Self {
        self.heartbeat = self.heartbeat.validated();
        self.reconnect = self.reconnect.validated();
        self.event_buffer = self.event_buffer.max(1);
        self.command_buffer = self.command_buffer.max(1);
        self
    }
}

// ---------------------------------------------------------------------------
// Events and snapshots
// ---------------------------------------------------------------------------

/// Everything the client reports to its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// The transport connection opened and the handshake was sent.
    Opened,
    /// Something changed in the game state.
    Session(SessionEvent),
    /// A server message failed to decode and was dropped.
    Malformed(String),
    /// The transport failed. A `Disconnected` follows.
    TransportError(String),
    /// A reconnect attempt will be made after `delay`.
    Reconnecting { attempt: u32, delay: Duration },
    /// The connection is gone.
    Disconnected { reason: String },
    /// The driver task has exited. Always the last event.
    Stopped,
}

/// Point-in-time copy of the session, returned by
/// [`ClientHandle::snapshot`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub connected: bool,
    pub self_id: Option<NetId>,
    pub current_turn: NetId,
    pub game_ongoing: bool,
    /// Roster in join order.
    pub players: Vec<PlayerSlot>,
}

impl SessionSnapshot {
    fn of(session: &Session) -> Self {
        Self {
            state: session.state(),
            connected: session.is_connected(),
            self_id: session.self_id(),
            current_turn: session.current_turn(),
            game_ongoing: session.game_ongoing(),
            players: session.roster().iter().cloned().collect(),
        }
    }

    pub fn player(&self, id: NetId) -> Option<&PlayerSlot> {
        self.players.iter().find(|p| p.id == id)
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for a [`RelicClient`].
///
/// # Example
///
/// ```rust,ignore
/// use relic::prelude::*;
///
/// let mut client = RelicClient::builder()
///     .url("ws://127.0.0.1:8080")
///     .build(ProtocolVersion::Compact)
///     .start();
/// while let Some(event) = client.next_event().await { /* ... */ }
/// ```
pub struct RelicClientBuilder<K = WebSocketConnector> {
    config: ClientConfig,
    connector: K,
}

impl RelicClientBuilder<WebSocketConnector> {
    pub fn new() -> Self {
        let config = ClientConfig::default();
        let connector = WebSocketConnector::new(config.url.clone());
        Self { config, connector }
    }

    /// Sets the server URL. Only `ws://` is supported.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.config.url = url.into();
        self.connector = WebSocketConnector::new(self.config.url.clone());
        self
    }
}

impl Default for RelicClientBuilder<WebSocketConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Connector> RelicClientBuilder<K> {
    pub fn heartbeat(mut self, heartbeat: HeartbeatConfig) -> Self {
        self.config.heartbeat = heartbeat;
        self
    }

    pub fn reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.config.reconnect = policy;
        self
    }

    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.config.event_buffer = capacity;
        self
    }

    pub fn command_buffer(mut self, capacity: usize) -> Self {
        self.config.command_buffer = capacity;
        self
    }

    /// Replaces the connector, e.g. with an in-memory one for tests.
    pub fn connector<K2: Connector>(self, connector: K2) -> RelicClientBuilder<K2> {
        RelicClientBuilder {
            config: self.config,
            connector,
        }
    }

    /// Finishes the builder. `version` must match the server's revision.
    pub fn build(self, version: ProtocolVersion) -> RelicClient<K> {
        RelicClient {
            config: self.config.validated(),
            connector: self.connector,
            version,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A configured, not yet running client.
pub struct RelicClient<K> {
    config: ClientConfig,
    connector: K,
    version: ProtocolVersion,
}

impl RelicClient<WebSocketConnector> {
    pub fn builder() -> RelicClientBuilder<WebSocketConnector> {
        RelicClientBuilder::new()
    }
}

impl<K: Connector> RelicClient<K> {
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Spawns the driver task and starts connecting.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> ClientHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(self.config.command_buffer);
        let (event_tx, event_rx) = mpsc::channel(self.config.event_buffer);

        let driver = Driver {
            outbox: Outbox::new(self.config.event_buffer),
            connector: self.connector,
            config: self.config,
            version: self.version,
            commands: cmd_rx,
            events: event_tx,
        };
        let task = tokio::spawn(driver.run());

        ClientHandle {
            commands: cmd_tx,
            events: event_rx,
            task: Some(task),
        }
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

enum Command {
    Move {
        x: f64,
        y: f64,
        reply: oneshot::Sender<Result<(), RelicError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    ForgetPlayer {
        id: NetId,
        reply: oneshot::Sender<Option<PlayerSlot>>,
    },
    Shutdown,
}

/// Owner's side of a running client.
///
/// Calls are served even while events are left unread, so it is fine to
/// call them from inside a [`next_event`](Self::next_event) loop.
/// Dropping the handle stops the driver.
pub struct ClientHandle {
    commands: mpsc::Sender<Command>,
    events: mpsc::Receiver<ClientEvent>,
    task: Option<JoinHandle<()>>,
}

impl ClientHandle {
    /// Asks the server to move our player to `(x, y)`.
    ///
    /// # Errors
    /// - [`RelicError::NotConnected`] while no connection is open
    /// - [`RelicError::Session`] until the first roster has arrived
    /// - [`RelicError::ClientStopped`] after the driver exited
    pub async fn request_move(&self, x: f64, y: f64) -> Result<(), RelicError> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::Move { x, y, reply }, rx).await?
    }

    /// Copies the current session state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, RelicError> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::Snapshot { reply }, rx).await
    }

    /// Removes a player from the roster and emits
    /// [`SessionEvent::PlayerLeft`]. Returns the removed entry.
    pub async fn forget_player(&self, id: NetId) -> Result<Option<PlayerSlot>, RelicError> {
        let (reply, rx) = oneshot::channel();
        self.call(Command::ForgetPlayer { id, reply }, rx).await
    }

    /// Next event, or `None` once the driver has exited and every event
    /// has been read.
    pub async fn next_event(&mut self) -> Option<ClientEvent> {
        self.events.recv().await
    }

    /// Closes the connection and waits for the driver to exit.
    pub async fn shutdown(mut self) {
        // Nobody will read the rest; lets the driver drop them.
        self.events.close();
        // A send error means the driver is already gone.
        let _ = self.commands.send(Command::Shutdown).await;
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "client task failed");
            }
        }
    }

    async fn call<T>(&self, cmd: Command, rx: oneshot::Receiver<T>) -> Result<T, RelicError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| RelicError::ClientStopped)?;
        rx.await.map_err(|_| RelicError::ClientStopped)
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// What the driver should do after handling a command.
enum Flow {
    Continue,
    Stop,
}

/// Events waiting for room in the event channel.
///
/// The driver never awaits the channel directly. Every select loop has a
/// branch that moves the front event into a reserved slot, so commands and
/// heartbeats keep flowing while the owner is behind. Inbound reads pause
/// once `limit` events are queued, which pushes back on the server instead
/// of growing without bound.
struct Outbox {
    queue: VecDeque<ClientEvent>,
    limit: usize,
    closed: bool,
}

impl Outbox {
    fn new(limit: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            limit,
            closed: false,
        }
    }

    fn push(&mut self, event: ClientEvent) {
        // The owner may have stopped listening; the client keeps running.
        if !self.closed {
            self.queue.push_back(event);
        }
    }

    fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    fn has_room(&self) -> bool {
        self.queue.len() < self.limit
    }

    /// Result of `events.reserve()` for the front event.
    fn deliver(
        &mut self,
        permit: Result<mpsc::Permit<'_, ClientEvent>, mpsc::error::SendError<()>>,
    ) {
        match permit {
            Ok(permit) => {
                if let Some(event) = self.queue.pop_front() {
                    permit.send(event);
                }
            }
            Err(_) => {
                tracing::debug!(dropped = self.queue.len(), "event receiver closed");
                self.queue.clear();
                self.closed = true;
            }
        }
    }
}

struct Driver<K: Connector> {
    connector: K,
    config: ClientConfig,
    version: ProtocolVersion,
    commands: mpsc::Receiver<Command>,
    events: mpsc::Sender<ClientEvent>,
    outbox: Outbox,
}

impl<K: Connector> Driver<K> {
    async fn run(mut self) {
        let mut backoff = Backoff::new(self.config.reconnect.clone());
        let mut link: Link<K::Connection> = Link::new(self.version);

        loop {
            let mut session = Session::new(self.version);
            if let Flow::Stop = self.connect_once(&mut session, &mut link, &mut backoff).await {
                break;
            }

            if !self.config.reconnect.enabled {
                break;
            }
            let Some(delay) = backoff.next_delay() else {
                tracing::info!(attempts = backoff.attempts(), "giving up on reconnect");
                break;
            };
            let attempt = backoff.attempts();
            tracing::info!(attempt, delay_ms = delay.as_millis() as u64, "reconnecting");
            self.outbox.push(ClientEvent::Reconnecting { attempt, delay });

            if let Flow::Stop = self.wait(delay, &mut session, &link).await {
                break;
            }
        }

        link.close().await;

        // Fail outstanding and future calls before waiting on the owner.
        self.commands.close();
        while self.commands.try_recv().is_ok() {}

        tracing::info!("client stopped");
        self.outbox.push(ClientEvent::Stopped);
        while let Some(event) = self.outbox.queue.pop_front() {
            if self.events.send(event).await.is_err() {
                break;
            }
        }
    }

    /// Opens one connection and runs it until it drops. Returns
    /// `Flow::Stop` if the owner asked to stop.
    async fn connect_once(
        &mut self,
        session: &mut Session,
        link: &mut Link<K::Connection>,
        backoff: &mut Backoff,
    ) -> Flow {
        if session.begin_connect().is_err() {
            return Flow::Stop;
        }

        let conn = {
            let connect = self.connector.connect();
            tokio::pin!(connect);
            loop {
                tokio::select! {
                    result = &mut connect => break result,
                    cmd = self.commands.recv() => {
                        if let Flow::Stop = handle_command(cmd, session, link, &mut self.outbox).await {
                            return Flow::Stop;
                        }
                    }
                    permit = self.events.reserve(), if self.outbox.has_pending() => {
                        self.outbox.deliver(permit);
                    }
                }
            }
        };

        let conn = match conn {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "connect failed");
                let reason = e.to_string();
                self.outbox.push(ClientEvent::TransportError(reason.clone()));
                session.on_close(&reason);
                self.outbox.push(ClientEvent::Disconnected { reason });
                return Flow::Continue;
            }
        };

        link.attach(conn);
        session.on_open();
        backoff.reset();
        self.outbox.push(ClientEvent::Opened);

        let mut heartbeat = HeartbeatScheduler::new(self.config.heartbeat.clone());
        let reason = match session.connect() {
            Some(request) => match link.send(&request).await {
                Ok(()) => self.pump(session, link, &mut heartbeat).await,
                Err(e) => {
                    self.outbox.push(ClientEvent::TransportError(e.to_string()));
                    Ok(e.to_string())
                }
            },
            None => self.pump(session, link, &mut heartbeat).await,
        };
        drop(heartbeat);

        let conn_id = link.conn_id();
        link.close().await;

        match reason {
            Ok(reason) => {
                tracing::info!(conn_id = ?conn_id, %reason, "disconnected");
                session.on_close(&reason);
                self.outbox.push(ClientEvent::Disconnected { reason });
                Flow::Continue
            }
            Err(()) => {
                session.on_close("client shut down");
                self.outbox.push(ClientEvent::Disconnected {
                    reason: "client shut down".into(),
                });
                Flow::Stop
            }
        }
    }

    /// The open-connection loop. Returns the disconnect reason, or `Err`
    /// if the owner asked to stop.
    async fn pump(
        &mut self,
        session: &mut Session,
        link: &Link<K::Connection>,
        heartbeat: &mut HeartbeatScheduler,
    ) -> Result<String, ()> {
        loop {
            tokio::select! {
                inbound = link.recv(), if self.outbox.has_room() => match inbound {
                    Ok(Inbound::Message(message)) => {
                        for event in session.dispatch(message) {
                            self.outbox.push(ClientEvent::Session(event));
                        }
                    }
                    Ok(Inbound::Malformed(e)) => {
                        self.outbox.push(ClientEvent::Malformed(e.to_string()));
                    }
                    Ok(Inbound::Closed) => return Ok("closed by server".into()),
                    Err(e) => {
                        tracing::warn!(error = %e, "receive failed");
                        self.outbox.push(ClientEvent::TransportError(e.to_string()));
                        return Ok(e.to_string());
                    }
                },
                _ = heartbeat.wait_for_beat() => {
                    if let Err(e) = link.send(&Message::Ping).await {
                        tracing::warn!(error = %e, "heartbeat send failed");
                        self.outbox.push(ClientEvent::TransportError(e.to_string()));
                        return Ok(e.to_string());
                    }
                }
                cmd = self.commands.recv() => {
                    if let Flow::Stop = handle_command(cmd, session, link, &mut self.outbox).await {
                        return Err(());
                    }
                }
                permit = self.events.reserve(), if self.outbox.has_pending() => {
                    self.outbox.deliver(permit);
                }
            }
        }
    }

    /// Sleeps through a backoff delay while still serving commands.
    async fn wait(
        &mut self,
        delay: Duration,
        session: &mut Session,
        link: &Link<K::Connection>,
    ) -> Flow {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return Flow::Continue,
                cmd = self.commands.recv() => {
                    if let Flow::Stop = handle_command(cmd, session, link, &mut self.outbox).await {
                        return Flow::Stop;
                    }
                }
                permit = self.events.reserve(), if self.outbox.has_pending() => {
                    self.outbox.deliver(permit);
                }
            }
        }
    }
}

async fn handle_command<C: Connection>(
    cmd: Option<Command>,
    session: &mut Session,
    link: &Link<C>,
    outbox: &mut Outbox,
) -> Flow {
    let Some(cmd) = cmd else {
        tracing::debug!("all client handles dropped");
        return Flow::Stop;
    };

    match cmd {
        Command::Move { x, y, reply } => {
            let result = if link.is_open() {
                match session.request_move(x, y) {
                    Ok(message) => link.send(&message).await,
                    Err(e) => Err(e.into()),
                }
            } else {
                Err(RelicError::NotConnected)
            };
            let _ = reply.send(result);
        }
        Command::Snapshot { reply } => {
            let _ = reply.send(SessionSnapshot::of(session));
        }
        Command::ForgetPlayer { id, reply } => {
            let removed = session.forget_player(id);
            if let Some(slot) = &removed {
                outbox.push(ClientEvent::Session(SessionEvent::PlayerLeft(slot.clone())));
            }
            let _ = reply.send(removed);
        }
        Command::Shutdown => return Flow::Stop,
    }
    Flow::Continue
}
