//! Protocol revisions.
//!
//! Two server revisions exist in the wild and they disagree on how wide a
//! player identifier is and on how the connecting player is pointed at in
//! the roster reply. Rather than guess which one is "right", the caller
//! picks a [`ProtocolVersion`] up front and it stays fixed for the whole
//! connection.

use serde::{Deserialize, Serialize};

use crate::NetId;

/// Width of a [`NetId`] on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdWidth {
    /// Little-endian `i16`.
    Two,
    /// Little-endian `i64`.
    Eight,
}

impl IdWidth {
    /// Number of bytes one identifier occupies.
    pub const fn bytes(self) -> usize {
        match self {
            Self::Two => 2,
            Self::Eight => 8,
        }
    }
}

/// What the last field of a `ConnectResponse` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelfField {
    /// A signed byte indexing the roster array.
    SlotIndex,
    /// An identifier of the version's width.
    Id,
}

/// A wire protocol revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProtocolVersion {
    /// Revision 1: 8-byte identifiers, `0` means "nobody", and the
    /// connecting player is given as a roster slot index.
    Legacy,
    /// Revision 2: 2-byte identifiers, `-1` means "nobody", and the
    /// connecting player is given by identifier.
    Compact,
}

impl ProtocolVersion {
    /// Numeric revision, for logs.
    pub const fn revision(self) -> u8 {
        match self {
            Self::Legacy => 1,
            Self::Compact => 2,
        }
    }

    pub const fn id_width(self) -> IdWidth {
        match self {
            Self::Legacy => IdWidth::Eight,
            Self::Compact => IdWidth::Two,
        }
    }

    /// The reserved identifier meaning "unassigned". Never a live player.
    pub const fn sentinel(self) -> NetId {
        match self {
            Self::Legacy => NetId(0),
            Self::Compact => NetId(-1),
        }
    }

    pub const fn self_field(self) -> SelfField {
        match self {
            Self::Legacy => SelfField::SlotIndex,
            Self::Compact => SelfField::Id,
        }
    }

    /// Whether `id` can be written in this revision's width.
    pub fn fits(self, id: NetId) -> bool {
        match self.id_width() {
            IdWidth::Two => i16::try_from(id.0).is_ok(),
            IdWidth::Eight => true,
        }
    }

    /// Whether `id` names a live player under this revision.
    pub fn is_live(self, id: NetId) -> bool {
        id != self.sentinel()
    }
}
