//! The set of players the server has told us about.

use relic_protocol::{NetId, PlayerSlot, ProtocolVersion, MAX_PLAYERS_IN_GAME};

/// Outcome of [`Roster::insert_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterInsert {
    /// The player was added.
    Inserted,
    /// A player with this id was already present. Nothing changed.
    AlreadyPresent,
    /// The roster already holds [`MAX_PLAYERS_IN_GAME`] players.
    Full,
    /// The id is the version's "nobody" value and was not added.
    Sentinel,
}

/// Up to eight players keyed by [`NetId`], in the order they were first seen.
#[derive(Debug, Clone)]
pub struct Roster {
    version: ProtocolVersion,
    players: Vec<PlayerSlot>,
}

impl Roster {
    /// Creates an empty roster. `version` decides which id is the sentinel.
    pub fn new(version: ProtocolVersion) -> Self {
        Self {
            version,
            players: Vec::with_capacity(MAX_PLAYERS_IN_GAME),
        }
    }

    pub fn get(&self, id: NetId) -> Option<&PlayerSlot> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: NetId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS_IN_GAME
    }

    /// Players in the order they joined.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerSlot> {
        self.players.iter()
    }

    /// Adds `slot` unless its id is already present, is the sentinel, or
    /// the roster is full. An existing entry is never overwritten.
    pub fn insert_if_absent(&mut self, slot: PlayerSlot) -> RosterInsert {
        if !self.version.is_live(slot.id) {
            return RosterInsert::Sentinel;
        }
        if self.contains(slot.id) {
            return RosterInsert::AlreadyPresent;
        }
        if self.is_full() {
            return RosterInsert::Full;
        }
        self.players.push(slot);
        RosterInsert::Inserted
    }

    /// Moves player `id` to `(x, y)`.
    ///
    /// Returns `None` if the player is unknown, otherwise whether the
    /// position actually changed.
    pub fn update_position(&mut self, id: NetId, x: f64, y: f64) -> Option<bool> {
        let player = self.players.iter_mut().find(|p| p.id == id)?;
        let changed = player.x.to_bits() != x.to_bits() || player.y.to_bits() != y.to_bits();
        player.x = x;
        player.y = y;
        Some(changed)
    }

    /// Removes and returns player `id`.
    pub fn remove(&mut self, id: NetId) -> Option<PlayerSlot> {
        let index = self.players.iter().position(|p| p.id == id)?;
        Some(self.players.remove(index))
    }
}
