//! Runs a small reference game server and a headless client against it
//! over a real WebSocket on localhost.
//!
//! ```text
//! RUST_LOG=debug cargo run -p loopback            # compact revision
//! RUST_LOG=debug cargo run -p loopback -- legacy  # legacy revision
//! ```

use std::sync::Arc;
use std::time::Duration;

use relic::prelude::*;
use relic::protocol::{
    BinaryCodec, Codec, ConnectResponse, Direction, MAX_PLAYERS_IN_GAME, SelfField, SelfRef,
};
use relic::transport::{Connection, Transport, WebSocketTransport};
use tokio::sync::{Mutex, mpsc};
use tracing_subscriber::EnvFilter;

const MAP_BOUND_X: f64 = 1.6;
const MAP_BOUND_Y: f64 = 1.0;

// ---------------------------------------------------------------------------
// Reference server
// ---------------------------------------------------------------------------

struct Member {
    slot: PlayerSlot,
    outbox: mpsc::UnboundedSender<Vec<u8>>,
}

/// Everyone who has sent a ConnectRequest, in join order.
struct Room {
    codec: BinaryCodec,
    members: Vec<Member>,
    next_id: i64,
}

impl Room {
    fn new(version: ProtocolVersion) -> Self {
        Self {
            codec: BinaryCodec::new(version),
            members: Vec::new(),
            next_id: 1,
        }
    }

    /// Adds a player and sends every member the new roster.
    fn join(&mut self, outbox: mpsc::UnboundedSender<Vec<u8>>) -> Option<NetId> {
        if self.members.len() >= MAX_PLAYERS_IN_GAME {
            tracing::warn!("room full, join refused");
            return None;
        }
        let id = NetId(self.next_id);
        self.next_id += 1;
        let slot = PlayerSlot::new(id, format!("Player {}", id.0), 0.0, 0.0);
        tracing::info!(player_id = %id, "player joined");
        self.members.push(Member { slot, outbox });
        self.broadcast_roster();
        Some(id)
    }

    fn leave(&mut self, id: NetId) {
        self.members.retain(|m| m.slot.id != id);
        tracing::info!(player_id = %id, remaining = self.members.len(), "player left");
    }

    /// Clamps the target to the map and tells everyone.
    fn apply_move(&mut self, id: NetId, x: f64, y: f64) {
        let x = x.clamp(-MAP_BOUND_X, MAP_BOUND_X);
        let y = y.clamp(-MAP_BOUND_Y, MAP_BOUND_Y);
        let Some(member) = self.members.iter_mut().find(|m| m.slot.id == id) else {
            return;
        };
        member.slot.x = x;
        member.slot.y = y;

        let message = Message::MoveCommand {
            player_id: Some(id),
            x,
            y,
        };
        match self.codec.encode(&message) {
            Ok(bytes) => {
                for m in &self.members {
                    let _ = m.outbox.send(bytes.clone());
                }
            }
            Err(e) => tracing::warn!(error = %e, "move broadcast failed"),
        }
    }

    fn broadcast_roster(&self) {
        let version = self.codec.version();
        let roster = std::array::from_fn(|i| match self.members.get(i) {
            Some(m) => m.slot.clone(),
            None => PlayerSlot {
                id: version.sentinel(),
                ..Default::default()
            },
        });

        for (index, member) in self.members.iter().enumerate() {
            let self_ref = match version.self_field() {
                SelfField::SlotIndex => SelfRef::Slot(index as i8),
                SelfField::Id => SelfRef::Id(member.slot.id),
            };
            let response = Message::ConnectResponse(ConnectResponse {
                roster: roster.clone(),
                current_turn: version.sentinel(),
                game_ongoing: !self.members.is_empty(),
                self_ref,
            });
            match self.codec.encode(&response) {
                Ok(bytes) => {
                    let _ = member.outbox.send(bytes);
                }
                Err(e) => tracing::warn!(error = %e, "roster encode failed"),
            }
        }
    }
}

async fn serve(mut transport: WebSocketTransport, room: Arc<Mutex<Room>>) {
    loop {
        match transport.accept().await {
            Ok(conn) => {
                tokio::spawn(serve_connection(conn, room.clone()));
            }
            Err(e) => {
                tracing::info!(error = %e, "server stopped accepting");
                break;
            }
        }
    }
}

async fn serve_connection<C: Connection>(conn: C, room: Arc<Mutex<Room>>) {
    let conn_id = conn.id();
    let codec = room.lock().await.codec;
    let (outbox, mut pending) = mpsc::unbounded_channel();
    let mut player: Option<NetId> = None;

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let bytes = match inbound {
                    Ok(Some(bytes)) => bytes,
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(%conn_id, error = %e, "receive failed");
                        break;
                    }
                };
                match codec.decode(Direction::ClientToServer, &bytes) {
                    Ok(Message::Ping) => {
                        let _ = outbox.send(bytes);
                    }
                    Ok(Message::ConnectRequest) if player.is_none() => {
                        player = room.lock().await.join(outbox.clone());
                        if player.is_none() {
                            break;
                        }
                    }
                    Ok(Message::MoveCommand { x, y, .. }) => {
                        if let Some(id) = player {
                            room.lock().await.apply_move(id, x, y);
                        }
                    }
                    Ok(other) => tracing::debug!(%conn_id, kind = other.kind(), "ignored"),
                    Err(e) => tracing::warn!(%conn_id, error = %e, "malformed client message"),
                }
            }
            Some(bytes) = pending.recv() => {
                if let Err(e) = conn.send(&bytes).await {
                    tracing::warn!(%conn_id, error = %e, "send failed");
                    break;
                }
            }
        }
    }

    if let Some(id) = player {
        room.lock().await.leave(id);
    }
    let _ = conn.close().await;
}

// ---------------------------------------------------------------------------
// Headless client
// ---------------------------------------------------------------------------

async fn play(url: String, version: ProtocolVersion) -> Result<(), RelicError> {
    let mut client = RelicClient::builder()
        .url(url)
        .heartbeat(HeartbeatConfig::with_interval(Duration::from_secs(1)))
        .build(version)
        .start();

    let targets = [(0.5, -0.25), (3.0, 4.0)];
    let mut next_target = 0;
    let mut me = None;

    while let Some(event) = client.next_event().await {
        tracing::info!(?event, "client event");
        match event {
            ClientEvent::Session(SessionEvent::Connected { self_id }) => {
                me = Some(self_id);
                client.request_move(targets[0].0, targets[0].1).await?;
                next_target = 1;
            }
            ClientEvent::Session(SessionEvent::PlayerMoved { id, .. }) if Some(id) == me => {
                if let Some(&(x, y)) = targets.get(next_target) {
                    client.request_move(x, y).await?;
                    next_target += 1;
                } else {
                    break;
                }
            }
            ClientEvent::Stopped => break,
            _ => {}
        }
    }

    let snapshot = client.snapshot().await?;
    for player in &snapshot.players {
        tracing::info!(
            player_id = %player.id,
            name = %player.name,
            x = player.x,
            y = player.y,
            "final position"
        );
    }
    client.shutdown().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let version = match std::env::args().nth(1).as_deref() {
        Some("legacy") => ProtocolVersion::Legacy,
        _ => ProtocolVersion::Compact,
    };

    let transport = WebSocketTransport::bind("127.0.0.1:0").await?;
    let url = format!("ws://{}", transport.local_addr()?);
    tracing::info!(%url, revision = version.revision(), "reference server listening");

    let room = Arc::new(Mutex::new(Room::new(version)));
    let server = tokio::spawn(serve(transport, room));

    tokio::time::timeout(Duration::from_secs(10), play(url, version)).await??;

    server.abort();
    Ok(())
}
