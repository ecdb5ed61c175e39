//! The session state machine.
//!
//! ```text
//!   Disconnected ──begin_connect──→ Connecting ──on_open──→ AwaitingFirstRoster
//!        ↑                                                        │
//!        │                                          first ConnectResponse
//!        │                                                        ▼
//!        └──────────────────── on_close (any state) ─────────── Active
//! ```
//!
//! A session that has been closed stays closed. Reconnecting means
//! building a new [`Session`].

use std::fmt;

use relic_protocol::{ConnectResponse, Message, NetId, PlayerSlot, ProtocolVersion, SelfRef};

use crate::{Roster, RosterInsert, SessionError};

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No transport. Either not started yet or closed for good.
    Disconnected,
    /// Transport is being opened.
    Connecting,
    /// Transport is open and the `ConnectRequest` is out; waiting for the
    /// first roster to learn who we are.
    AwaitingFirstRoster,
    /// Self identity is known. Moves may be sent.
    Active,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::AwaitingFirstRoster => "awaiting first roster",
            Self::Active => "active",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// SessionEvent
// ---------------------------------------------------------------------------

/// A change in session state worth telling the world model about.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A player appeared in the roster for the first time.
    PlayerJoined(PlayerSlot),
    /// A known player's position changed.
    PlayerMoved { id: NetId, x: f64, y: f64 },
    /// A player was removed with [`Session::forget_player`].
    PlayerLeft(PlayerSlot),
    /// The server moved the turn to another player.
    TurnChanged { previous: NetId, current: NetId },
    /// The first roster arrived and named us. Fires once per session.
    Connected { self_id: NetId },
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Client-side view of one connection to the game server.
#[derive(Debug, Clone)]
pub struct Session {
    version: ProtocolVersion,
    state: SessionState,
    closed: bool,
    connect_sent: bool,
    connected: bool,
    self_id: Option<NetId>,
    current_turn: NetId,
    game_ongoing: bool,
    roster: Roster,
}

impl Session {
    /// Creates a session in [`SessionState::Disconnected`].
    ///
    /// `version` is fixed for the life of the session.
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            state: SessionState::Disconnected,
            closed: false,
            connect_sent: false,
            connected: false,
            self_id: None,
            current_turn: version.sentinel(),
            game_ongoing: false,
            roster: Roster::new(version),
        }
    }

    // -- Lifecycle ----------------------------------------------------------

    /// The transport is about to be opened.
    ///
    /// # Errors
    /// [`SessionError::Terminated`] if the session was already closed.
    pub fn begin_connect(&mut self) -> Result<(), SessionError> {
        if self.closed {
            return Err(SessionError::Terminated);
        }
        if self.state == SessionState::Disconnected {
            self.state = SessionState::Connecting;
            tracing::debug!(revision = self.version.revision(), "session connecting");
        }
        Ok(())
    }

    /// The transport is open.
    pub fn on_open(&mut self) {
        if self.state == SessionState::Connecting {
            self.state = SessionState::AwaitingFirstRoster;
            tracing::info!(revision = self.version.revision(), "connection open");
        } else {
            tracing::debug!(state = %self.state, "on_open ignored");
        }
    }

    /// The handshake message to send right after opening.
    ///
    /// Returns `Some(ConnectRequest)` the first time it is called once the
    /// transport is open, and `None` on every other call.
    pub fn connect(&mut self) -> Option<Message> {
        if self.state != SessionState::AwaitingFirstRoster || self.connect_sent {
            return None;
        }
        self.connect_sent = true;
        Some(Message::ConnectRequest)
    }

    /// The transport closed. Terminal.
    pub fn on_close(&mut self, reason: &str) {
        if !self.closed {
            tracing::info!(
                reason,
                state = %self.state,
                self_id = ?self.self_id,
                "session closed"
            );
        }
        self.closed = true;
        self.state = SessionState::Disconnected;
    }

    // -- Inbound ------------------------------------------------------------

    /// Applies one message from the server and returns what changed, in
    /// order.
    pub fn dispatch(&mut self, message: Message) -> Vec<SessionEvent> {
        if !matches!(
            self.state,
            SessionState::AwaitingFirstRoster | SessionState::Active
        ) {
            tracing::debug!(state = %self.state, kind = message.kind(), "dropping message");
            return Vec::new();
        }

        tracing::debug!(kind = message.kind(), opcode = message.opcode(), "dispatch");

        match message {
            Message::Ping => Vec::new(),
            Message::MoveCommand {
                player_id: Some(id),
                x,
                y,
            } => self.apply_move(id, x, y),
            Message::MoveCommand { player_id: None, .. } => {
                tracing::debug!("move without player id ignored");
                Vec::new()
            }
            Message::ConnectResponse(response) => self.apply_connect_response(response),
            Message::ConnectRequest => {
                tracing::debug!("unexpected ConnectRequest from server ignored");
                Vec::new()
            }
            Message::Unknown { opcode, payload } => {
                tracing::debug!(opcode, len = payload.len(), "unknown opcode ignored");
                Vec::new()
            }
        }
    }

    fn apply_move(&mut self, id: NetId, x: f64, y: f64) -> Vec<SessionEvent> {
        match self.roster.update_position(id, x, y) {
            Some(_) => vec![SessionEvent::PlayerMoved { id, x, y }],
            None => {
                tracing::debug!(player_id = %id, "move for unknown player ignored");
                Vec::new()
            }
        }
    }

    fn apply_connect_response(&mut self, response: ConnectResponse) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        for slot in &response.roster {
            let (id, x, y) = (slot.id, slot.x, slot.y);
            match self.roster.insert_if_absent(slot.clone()) {
                RosterInsert::Inserted => {
                    tracing::debug!(player_id = %id, name = %slot.name, "player joined");
                    events.push(SessionEvent::PlayerJoined(slot.clone()));
                }
                RosterInsert::AlreadyPresent => {
                    if self.roster.update_position(id, x, y) == Some(true) {
                        events.push(SessionEvent::PlayerMoved { id, x, y });
                    }
                }
                RosterInsert::Full => {
                    tracing::warn!(player_id = %id, "roster full, player dropped");
                }
                RosterInsert::Sentinel => {}
            }
        }

        if response.current_turn != self.current_turn {
            events.push(SessionEvent::TurnChanged {
                previous: self.current_turn,
                current: response.current_turn,
            });
            self.current_turn = response.current_turn;
        }
        self.game_ongoing = response.game_ongoing;

        if self.self_id.is_none() {
            match self.resolve_self(&response) {
                Some(self_id) => {
                    self.self_id = Some(self_id);
                    self.connected = true;
                    self.state = SessionState::Active;
                    tracing::info!(
                        self_id = %self_id,
                        players = self.roster.len(),
                        "roster received, session active"
                    );
                    events.push(SessionEvent::Connected { self_id });
                }
                None => {
                    tracing::warn!(
                        self_ref = ?response.self_ref,
                        "self reference does not name a live player"
                    );
                }
            }
        }

        events
    }

    fn resolve_self(&self, response: &ConnectResponse) -> Option<NetId> {
        let id = match response.self_ref {
            SelfRef::Slot(index) => {
                let index = usize::try_from(index).ok()?;
                response.roster.get(index)?.id
            }
            SelfRef::Id(id) => id,
        };
        self.version.is_live(id).then_some(id)
    }

    // -- Outbound -----------------------------------------------------------

    /// Builds a move request for our own player.
    ///
    /// The message carries no identifier; the server knows who sent it.
    ///
    /// # Errors
    /// [`SessionError::NotActive`] until the first roster has named us.
    pub fn request_move(&self, x: f64, y: f64) -> Result<Message, SessionError> {
        if self.state != SessionState::Active {
            return Err(SessionError::NotActive(self.state));
        }
        Ok(Message::MoveCommand {
            player_id: None,
            x,
            y,
        })
    }

    /// Drops a player from the roster. The wire has no leave message, so
    /// the world model calls this when it learns of a departure some other
    /// way.
    pub fn forget_player(&mut self, id: NetId) -> Option<PlayerSlot> {
        let removed = self.roster.remove(id);
        if removed.is_some() {
            tracing::debug!(player_id = %id, "player forgotten");
        }
        removed
    }

    // -- Accessors ----------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the first roster has been received. Latches on and stays on,
    /// even after the session closes.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether [`on_close`](Self::on_close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn self_id(&self) -> Option<NetId> {
        self.self_id
    }

    /// Whose turn it is. The sentinel until the server says otherwise.
    pub fn current_turn(&self) -> NetId {
        self.current_turn
    }

    pub fn game_ongoing(&self) -> bool {
        self.game_ongoing
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relic_protocol::{BinaryCodec, Codec, Direction, MAX_PLAYERS_IN_GAME};

    // =====================================================================
    // Helpers
    // =====================================================================

    fn empty_slot(version: ProtocolVersion) -> PlayerSlot {
        PlayerSlot {
            id: version.sentinel(),
            ..Default::default()
        }
    }

    /// A response with `players` in the first slots and sentinels after.
    fn response(
        version: ProtocolVersion,
        players: &[PlayerSlot],
        current_turn: NetId,
        self_ref: SelfRef,
    ) -> Message {
        let roster = std::array::from_fn(|i| {
            players
                .get(i)
                .cloned()
                .unwrap_or_else(|| empty_slot(version))
        });
        Message::ConnectResponse(ConnectResponse {
            roster,
            current_turn,
            game_ongoing: false,
            self_ref,
        })
    }

    fn open(version: ProtocolVersion) -> Session {
        let mut s = Session::new(version);
        s.begin_connect().unwrap();
        s.on_open();
        s
    }

    fn bob() -> PlayerSlot {
        PlayerSlot::new(NetId(7), "Bob", 1.5, -2.25)
    }

    fn alice() -> PlayerSlot {
        PlayerSlot::new(NetId(3), "Alice", 0.5, 0.5)
    }

    // =====================================================================
    // Lifecycle
    // =====================================================================

    #[test]
    fn test_new_session_is_disconnected() {
        let s = Session::new(ProtocolVersion::Compact);
        assert_eq!(s.state(), SessionState::Disconnected);
        assert!(!s.is_connected());
        assert_eq!(s.self_id(), None);
        assert_eq!(s.current_turn(), NetId(-1));
        assert!(s.roster().is_empty());
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut s = Session::new(ProtocolVersion::Compact);
        s.begin_connect().unwrap();
        assert_eq!(s.state(), SessionState::Connecting);

        s.on_open();
        assert_eq!(s.state(), SessionState::AwaitingFirstRoster);

        s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));
        assert_eq!(s.state(), SessionState::Active);
    }

    #[test]
    fn test_on_open_before_begin_connect_is_ignored() {
        let mut s = Session::new(ProtocolVersion::Compact);
        s.on_open();
        assert_eq!(s.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_connect_returns_request_once() {
        let mut s = open(ProtocolVersion::Compact);
        assert_eq!(s.connect(), Some(Message::ConnectRequest));
        assert_eq!(s.connect(), None);
        assert_eq!(s.connect(), None);
    }

    #[test]
    fn test_connect_before_open_returns_none() {
        let mut s = Session::new(ProtocolVersion::Compact);
        assert_eq!(s.connect(), None);
        s.begin_connect().unwrap();
        assert_eq!(s.connect(), None);

        s.on_open();
        assert_eq!(s.connect(), Some(Message::ConnectRequest));
    }

    #[test]
    fn test_close_is_terminal() {
        let mut s = open(ProtocolVersion::Compact);
        s.on_close("server went away");
        assert_eq!(s.state(), SessionState::Disconnected);
        assert!(s.is_closed());
        assert_eq!(s.begin_connect(), Err(SessionError::Terminated));
        assert_eq!(s.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_close_keeps_connected_latch() {
        let mut s = open(ProtocolVersion::Compact);
        s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));
        s.on_close("bye");
        assert!(s.is_connected());
        assert_eq!(s.self_id(), Some(NetId(7)));
    }

    #[test]
    fn test_dispatch_after_close_is_dropped() {
        let mut s = open(ProtocolVersion::Compact);
        s.on_close("bye");
        let events = s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));
        assert!(events.is_empty());
        assert!(s.roster().is_empty());
    }

    // =====================================================================
    // Roster from ConnectResponse
    // =====================================================================

    #[test]
    fn test_end_to_end_first_roster() {
        let mut s = open(ProtocolVersion::Compact);
        let events = s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));

        assert_eq!(
            events,
            vec![
                SessionEvent::PlayerJoined(bob()),
                SessionEvent::Connected { self_id: NetId(7) },
            ]
        );
        let entry = s.roster().get(NetId(7)).unwrap();
        assert_eq!(entry.name, "Bob");
        assert_eq!((entry.x, entry.y), (1.5, -2.25));
        assert_eq!(s.self_id(), Some(NetId(7)));
        assert!(s.is_connected());
    }

    #[test]
    fn test_sentinel_slots_never_inserted() {
        for version in [ProtocolVersion::Legacy, ProtocolVersion::Compact] {
            let mut s = open(version);
            let self_ref = match version {
                ProtocolVersion::Legacy => SelfRef::Slot(0),
                ProtocolVersion::Compact => SelfRef::Id(NetId(7)),
            };
            s.dispatch(response(version, &[bob()], version.sentinel(), self_ref));

            assert_eq!(s.roster().len(), 1, "{version:?}");
            assert!(!s.roster().contains(version.sentinel()));
        }
    }

    #[test]
    fn test_roster_insert_is_idempotent_across_responses() {
        let mut s = open(ProtocolVersion::Compact);
        let msg = response(
            ProtocolVersion::Compact,
            &[bob(), alice()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        );
        s.dispatch(msg.clone());
        let events = s.dispatch(msg);

        assert!(events.is_empty());
        assert_eq!(s.roster().len(), 2);
    }

    #[test]
    fn test_existing_entry_keeps_name_but_moves() {
        let mut s = open(ProtocolVersion::Compact);
        s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));

        let renamed = PlayerSlot::new(NetId(7), "Robert", 9.0, 9.0);
        let events = s.dispatch(response(
            ProtocolVersion::Compact,
            &[renamed],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));

        assert_eq!(
            events,
            vec![SessionEvent::PlayerMoved {
                id: NetId(7),
                x: 9.0,
                y: 9.0
            }]
        );
        assert_eq!(s.roster().get(NetId(7)).unwrap().name, "Bob");
    }

    #[test]
    fn test_later_roster_adds_new_players() {
        let mut s = open(ProtocolVersion::Compact);
        s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));
        let events = s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob(), alice()],
            NetId(-1),
            SelfRef::Id(NetId(3)),
        ));

        assert_eq!(events, vec![SessionEvent::PlayerJoined(alice())]);
        assert_eq!(s.roster().len(), 2);
    }

    #[test]
    fn test_roster_never_exceeds_capacity() {
        let mut s = open(ProtocolVersion::Compact);
        let first: Vec<_> = (0..MAX_PLAYERS_IN_GAME as i64)
            .map(|i| PlayerSlot::new(NetId(i), format!("p{i}"), 0.0, 0.0))
            .collect();
        s.dispatch(response(
            ProtocolVersion::Compact,
            &first,
            NetId(-1),
            SelfRef::Id(NetId(0)),
        ));

        let second: Vec<_> = (100..100 + MAX_PLAYERS_IN_GAME as i64)
            .map(|i| PlayerSlot::new(NetId(i), format!("p{i}"), 0.0, 0.0))
            .collect();
        let events = s.dispatch(response(
            ProtocolVersion::Compact,
            &second,
            NetId(-1),
            SelfRef::Id(NetId(0)),
        ));

        assert!(events.is_empty());
        assert_eq!(s.roster().len(), MAX_PLAYERS_IN_GAME);
    }

    // =====================================================================
    // Self identity
    // =====================================================================

    #[test]
    fn test_self_id_latches_on_first_response() {
        let mut s = open(ProtocolVersion::Compact);
        s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob(), alice()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));
        let events = s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob(), alice()],
            NetId(-1),
            SelfRef::Id(NetId(3)),
        ));

        assert_eq!(s.self_id(), Some(NetId(7)));
        assert!(!events.iter().any(|e| matches!(e, SessionEvent::Connected { .. })));
    }

    #[test]
    fn test_legacy_self_slot_resolves_through_roster() {
        let mut s = open(ProtocolVersion::Legacy);
        let events = s.dispatch(response(
            ProtocolVersion::Legacy,
            &[alice(), bob()],
            NetId(0),
            SelfRef::Slot(1),
        ));

        assert_eq!(s.self_id(), Some(NetId(7)));
        assert_eq!(
            events.last(),
            Some(&SessionEvent::Connected { self_id: NetId(7) })
        );
    }

    #[test]
    fn test_unresolvable_self_ref_waits() {
        let mut s = open(ProtocolVersion::Legacy);

        // Slot 5 is empty, slot -1 and slot 12 do not exist.
        for bad in [SelfRef::Slot(5), SelfRef::Slot(-1), SelfRef::Slot(12)] {
            s.dispatch(response(ProtocolVersion::Legacy, &[bob()], NetId(0), bad));
            assert_eq!(s.state(), SessionState::AwaitingFirstRoster);
            assert_eq!(s.self_id(), None);
            assert!(!s.is_connected());
        }

        // The roster itself was still applied.
        assert!(s.roster().contains(NetId(7)));

        s.dispatch(response(
            ProtocolVersion::Legacy,
            &[bob()],
            NetId(0),
            SelfRef::Slot(0),
        ));
        assert_eq!(s.self_id(), Some(NetId(7)));
    }

    #[test]
    fn test_sentinel_self_id_is_rejected() {
        let mut s = open(ProtocolVersion::Compact);
        s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(-1)),
        ));
        assert_eq!(s.state(), SessionState::AwaitingFirstRoster);
    }

    // =====================================================================
    // Turn and game flags
    // =====================================================================

    #[test]
    fn test_turn_change_emits_event() {
        let mut s = open(ProtocolVersion::Compact);
        let events = s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob(), alice()],
            NetId(3),
            SelfRef::Id(NetId(7)),
        ));
        assert!(events.contains(&SessionEvent::TurnChanged {
            previous: NetId(-1),
            current: NetId(3),
        }));
        assert_eq!(s.current_turn(), NetId(3));

        let events = s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob(), alice()],
            NetId(3),
            SelfRef::Id(NetId(7)),
        ));
        assert!(events.is_empty());
    }

    #[test]
    fn test_game_ongoing_tracks_last_response() {
        let mut s = open(ProtocolVersion::Compact);
        let Message::ConnectResponse(mut resp) = response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ) else {
            unreachable!()
        };
        resp.game_ongoing = true;
        s.dispatch(Message::ConnectResponse(resp.clone()));
        assert!(s.game_ongoing());

        resp.game_ongoing = false;
        s.dispatch(Message::ConnectResponse(resp));
        assert!(!s.game_ongoing());
    }

    // =====================================================================
    // Moves
    // =====================================================================

    #[test]
    fn test_inbound_move_updates_known_player() {
        let mut s = open(ProtocolVersion::Compact);
        s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));

        let events = s.dispatch(Message::MoveCommand {
            player_id: Some(NetId(7)),
            x: -1.0,
            y: 0.75,
        });
        assert_eq!(
            events,
            vec![SessionEvent::PlayerMoved {
                id: NetId(7),
                x: -1.0,
                y: 0.75
            }]
        );
        let entry = s.roster().get(NetId(7)).unwrap();
        assert_eq!((entry.x, entry.y), (-1.0, 0.75));
    }

    #[test]
    fn test_inbound_move_for_unknown_player_ignored() {
        let mut s = open(ProtocolVersion::Compact);
        s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));

        let events = s.dispatch(Message::MoveCommand {
            player_id: Some(NetId(99)),
            x: 1.0,
            y: 1.0,
        });
        assert!(events.is_empty());
        assert_eq!(s.roster().len(), 1);
    }

    #[test]
    fn test_ping_and_unknown_are_noops() {
        let mut s = open(ProtocolVersion::Compact);
        assert!(s.dispatch(Message::Ping).is_empty());
        assert!(s
            .dispatch(Message::Unknown {
                opcode: 42,
                payload: vec![1, 2, 3],
            })
            .is_empty());
        assert_eq!(s.state(), SessionState::AwaitingFirstRoster);
    }

    #[test]
    fn test_request_move_requires_active() {
        let mut s = Session::new(ProtocolVersion::Compact);
        assert_eq!(
            s.request_move(1.0, 1.0),
            Err(SessionError::NotActive(SessionState::Disconnected))
        );

        s.begin_connect().unwrap();
        s.on_open();
        assert_eq!(
            s.request_move(1.0, 1.0),
            Err(SessionError::NotActive(SessionState::AwaitingFirstRoster))
        );
    }

    #[test]
    fn test_request_move_round_trips_without_id() {
        let mut s = open(ProtocolVersion::Compact);
        s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));

        let msg = s.request_move(3.0, 4.0).unwrap();
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let bytes = codec.encode(&msg).unwrap();
        assert_eq!(bytes.len(), 18);

        let decoded = codec.decode(Direction::ClientToServer, &bytes).unwrap();
        assert_eq!(
            decoded,
            Message::MoveCommand {
                player_id: None,
                x: 3.0,
                y: 4.0
            }
        );
    }

    // =====================================================================
    // forget_player
    // =====================================================================

    #[test]
    fn test_forget_player_removes_entry() {
        let mut s = open(ProtocolVersion::Compact);
        s.dispatch(response(
            ProtocolVersion::Compact,
            &[bob(), alice()],
            NetId(-1),
            SelfRef::Id(NetId(7)),
        ));

        assert_eq!(s.forget_player(NetId(3)), Some(alice()));
        assert_eq!(s.forget_player(NetId(3)), None);
        assert_eq!(s.roster().len(), 1);
    }
}
