//! Byte layouts for every message, as one declarative table.
//!
//! Every message is a 2-byte little-endian opcode followed by a payload
//! whose fields are listed, in order, in the table below. Nothing in the
//! crate computes an offset by hand: [`write_fields`] and [`read_fields`]
//! walk a [`Layout`] and do the arithmetic once.
//!
//! ```text
//! opcode  direction        payload
//! ------  ---------------  ----------------------------------------------
//!   0     both             (none)
//!   1     client->server   x:f64 y:f64
//!   1     server->client   player_id:NetId x:f64 y:f64
//!   2     client->server   placeholder:u8
//!   2     server->client   ids[8]:NetId names[8]:[u8;32] coords[8]:(f64,f64)
//!                          current_turn:NetId game_ongoing:u8 self:(i8|NetId)
//! ```

use crate::version::{IdWidth, SelfField};
use crate::{Direction, NetId, ProtocolError, ProtocolVersion};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Size of the leading opcode.
pub const OPCODE_SIZE: usize = 2;
/// Number of roster slots in a `ConnectResponse`.
pub const MAX_PLAYERS_IN_GAME: usize = 8;
/// Width of a name window on the wire.
pub const MAX_CREDENTIAL_LEN: usize = 32;
/// One `{x, y}` pair.
pub const COORD_SIZE: usize = 16;
/// Largest message the server will buffer. Encoders refuse to go past it.
pub const MAX_PACKET_SIZE: usize = 1024;

pub const OPCODE_PING: u16 = 0;
pub const OPCODE_MOVE: u16 = 1;
pub const OPCODE_CONNECT: u16 = 2;

/// Whether `opcode` has a layout in this build.
pub fn is_known_opcode(opcode: u16) -> bool {
    matches!(opcode, OPCODE_PING | OPCODE_MOVE | OPCODE_CONNECT)
}

// ---------------------------------------------------------------------------
// Declarative layout
// ---------------------------------------------------------------------------

/// The primitive kinds a field can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A player identifier, as wide as the protocol version says.
    NetId,
    /// IEEE-754 double.
    F64,
    /// One byte; any nonzero value reads as `true`.
    Flag,
    /// One signed byte indexing the roster.
    SlotIndex,
    /// A NUL-padded [`MAX_CREDENTIAL_LEN`]-byte text window.
    Name,
    /// One byte that carries no information.
    Placeholder,
}

impl FieldKind {
    /// Bytes taken by one value of this kind.
    pub const fn width(self, id_width: IdWidth) -> usize {
        match self {
            Self::NetId => id_width.bytes(),
            Self::F64 => 8,
            Self::Flag | Self::SlotIndex | Self::Placeholder => 1,
            Self::Name => MAX_CREDENTIAL_LEN,
        }
    }
}

/// A run of `count` consecutive values of the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub count: usize,
}

const fn field(name: &'static str, kind: FieldKind, count: usize) -> FieldSpec {
    FieldSpec { name, kind, count }
}

/// The layout of one message: which opcode, which direction, which fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub opcode: u16,
    pub direction: Direction,
    pub fields: &'static [FieldSpec],
}

impl Layout {
    /// Bytes after the opcode.
    pub fn payload_len(&self, id_width: IdWidth) -> usize {
        self.fields
            .iter()
            .map(|f| f.kind.width(id_width) * f.count)
            .sum()
    }

    /// Total encoded length, opcode included.
    pub fn message_len(&self, id_width: IdWidth) -> usize {
        OPCODE_SIZE + self.payload_len(id_width)
    }

    /// Number of individual values the layout holds.
    pub fn value_count(&self) -> usize {
        self.fields.iter().map(|f| f.count).sum()
    }
}

use FieldKind::{F64, Flag, Name, Placeholder, SlotIndex};

const PING: &[FieldSpec] = &[];

const MOVE_REQUEST: &[FieldSpec] = &[field("x", F64, 1), field("y", F64, 1)];

const MOVE_BROADCAST: &[FieldSpec] = &[
    field("player_id", FieldKind::NetId, 1),
    field("x", F64, 1),
    field("y", F64, 1),
];

const CONNECT_REQUEST: &[FieldSpec] = &[field("placeholder", Placeholder, 1)];

/// Coordinates are stored as x0, y0, x1, y1, ...
const CONNECT_RESPONSE_BY_SLOT: &[FieldSpec] = &[
    field("ids", FieldKind::NetId, MAX_PLAYERS_IN_GAME),
    field("names", Name, MAX_PLAYERS_IN_GAME),
    field("coords", F64, MAX_PLAYERS_IN_GAME * 2),
    field("current_turn", FieldKind::NetId, 1),
    field("game_ongoing", Flag, 1),
    field("self", SlotIndex, 1),
];

const CONNECT_RESPONSE_BY_ID: &[FieldSpec] = &[
    field("ids", FieldKind::NetId, MAX_PLAYERS_IN_GAME),
    field("names", Name, MAX_PLAYERS_IN_GAME),
    field("coords", F64, MAX_PLAYERS_IN_GAME * 2),
    field("current_turn", FieldKind::NetId, 1),
    field("game_ongoing", Flag, 1),
    field("self", FieldKind::NetId, 1),
];

/// Looks up the layout for an opcode travelling in `direction`.
///
/// Returns `None` for opcodes this build doesn't know.
pub fn layout(
    opcode: u16,
    direction: Direction,
    version: ProtocolVersion,
) -> Option<Layout> {
    let fields = match (opcode, direction) {
        (OPCODE_PING, _) => PING,
        (OPCODE_MOVE, Direction::ClientToServer) => MOVE_REQUEST,
        (OPCODE_MOVE, Direction::ServerToClient) => MOVE_BROADCAST,
        (OPCODE_CONNECT, Direction::ClientToServer) => CONNECT_REQUEST,
        (OPCODE_CONNECT, Direction::ServerToClient) => {
            match version.self_field() {
                SelfField::SlotIndex => CONNECT_RESPONSE_BY_SLOT,
                SelfField::Id => CONNECT_RESPONSE_BY_ID,
            }
        }
        _ => return None,
    };
    Some(Layout {
        opcode,
        direction,
        fields,
    })
}

// ---------------------------------------------------------------------------
// Values
// ---------------------------------------------------------------------------

/// One decoded field value. The codec flattens a `Message` into these (and
/// back) so the table walk itself stays message-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    NetId(NetId),
    F64(f64),
    Flag(bool),
    SlotIndex(i8),
    Name(String),
    Placeholder,
}

impl Value {
    fn kind(&self) -> FieldKind {
        match self {
            Self::NetId(_) => FieldKind::NetId,
            Self::F64(_) => F64,
            Self::Flag(_) => Flag,
            Self::SlotIndex(_) => SlotIndex,
            Self::Name(_) => Name,
            Self::Placeholder => Placeholder,
        }
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Writes the opcode and then `values` in the order `layout` declares.
///
/// # Errors
/// [`ProtocolError::InvalidMessage`] when the values don't line up with the
/// layout, a name doesn't fit its window, or an identifier doesn't fit the
/// version's width.
pub(crate) fn write_fields(
    layout: &Layout,
    version: ProtocolVersion,
    values: &[Value],
    out: &mut Vec<u8>,
) -> Result<(), ProtocolError> {
    if values.len() != layout.value_count() {
        return Err(ProtocolError::InvalidMessage(format!(
            "opcode {} expects {} values, got {}",
            layout.opcode,
            layout.value_count(),
            values.len()
        )));
    }

    out.reserve(layout.message_len(version.id_width()));
    out.extend_from_slice(&layout.opcode.to_le_bytes());

    let mut values = values.iter();
    for spec in layout.fields {
        for _ in 0..spec.count {
            // Length was checked above, so the iterator can't run dry.
            let Some(value) = values.next() else {
                break;
            };
            if value.kind() != spec.kind {
                return Err(ProtocolError::InvalidMessage(format!(
                    "field `{}` expects {:?}, got {:?}",
                    spec.name,
                    spec.kind,
                    value.kind()
                )));
            }
            write_value(spec, value, version, out)?;
        }
    }
    Ok(())
}

fn write_value(
    spec: &FieldSpec,
    value: &Value,
    version: ProtocolVersion,
    out: &mut Vec<u8>,
) -> Result<(), ProtocolError> {
    match value {
        Value::NetId(id) => match version.id_width() {
            IdWidth::Two => {
                let narrow = i16::try_from(id.0).map_err(|_| {
                    ProtocolError::InvalidMessage(format!(
                        "field `{}`: {id} does not fit in 2 bytes",
                        spec.name
                    ))
                })?;
                out.extend_from_slice(&narrow.to_le_bytes());
            }
            IdWidth::Eight => out.extend_from_slice(&id.0.to_le_bytes()),
        },
        Value::F64(v) => out.extend_from_slice(&v.to_le_bytes()),
        Value::Flag(b) => out.push(u8::from(*b)),
        Value::SlotIndex(i) => out.extend_from_slice(&i.to_le_bytes()),
        Value::Name(name) => {
            let bytes = name.as_bytes();
            if bytes.len() > MAX_CREDENTIAL_LEN {
                return Err(ProtocolError::InvalidMessage(format!(
                    "field `{}`: name is {} bytes, max {MAX_CREDENTIAL_LEN}",
                    spec.name,
                    bytes.len()
                )));
            }
            if bytes.contains(&0) {
                return Err(ProtocolError::InvalidMessage(format!(
                    "field `{}`: name contains a NUL byte",
                    spec.name
                )));
            }
            let mut window = [0u8; MAX_CREDENTIAL_LEN];
            window[..bytes.len()].copy_from_slice(bytes);
            out.extend_from_slice(&window);
        }
        Value::Placeholder => out.push(0),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// A bounds-checked cursor over a received buffer.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    opcode: Option<u16>,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            opcode: None,
        }
    }

    /// Bytes not yet consumed.
    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Fails with `Malformed` unless at least `needed` bytes (counted from
    /// the start of the buffer) are present.
    pub(crate) fn require(&self, needed: usize) -> Result<(), ProtocolError> {
        if self.data.len() < needed {
            return Err(ProtocolError::Malformed {
                opcode: self.opcode,
                needed,
                available: self.data.len(),
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        self.require(self.pos + N)?;
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(buf)
    }

    pub(crate) fn read_opcode(&mut self) -> Result<u16, ProtocolError> {
        let opcode = u16::from_le_bytes(self.take::<2>()?);
        self.opcode = Some(opcode);
        Ok(opcode)
    }

    fn read_value(
        &mut self,
        kind: FieldKind,
        id_width: IdWidth,
    ) -> Result<Value, ProtocolError> {
        Ok(match kind {
            FieldKind::NetId => match id_width {
                IdWidth::Two => {
                    Value::NetId(NetId(i16::from_le_bytes(self.take::<2>()?).into()))
                }
                IdWidth::Eight => {
                    Value::NetId(NetId(i64::from_le_bytes(self.take::<8>()?)))
                }
            },
            F64 => Value::F64(f64::from_le_bytes(self.take::<8>()?)),
            Flag => Value::Flag(self.take::<1>()?[0] != 0),
            SlotIndex => Value::SlotIndex(i8::from_le_bytes(self.take::<1>()?)),
            Name => {
                let window = self.take::<MAX_CREDENTIAL_LEN>()?;
                Value::Name(name_from_window(&window))
            }
            Placeholder => {
                self.take::<1>()?;
                Value::Placeholder
            }
        })
    }
}

/// Text up to the first NUL; the whole window if there is none.
pub fn name_from_window(window: &[u8]) -> String {
    let end = window.iter().position(|&b| b == 0).unwrap_or(window.len());
    String::from_utf8_lossy(&window[..end]).into_owned()
}

/// Reads every value `layout` declares. The opcode must already have been
/// consumed from `reader`.
///
/// The whole length is checked before the first field is touched, so a
/// short buffer never produces a half-decoded message.
pub(crate) fn read_fields(
    layout: &Layout,
    version: ProtocolVersion,
    reader: &mut Reader<'_>,
) -> Result<Vec<Value>, ProtocolError> {
    let id_width = version.id_width();
    reader.require(layout.message_len(id_width))?;

    let mut values = Vec::with_capacity(layout.value_count());
    for spec in layout.fields {
        for _ in 0..spec.count {
            values.push(reader.read_value(spec.kind, id_width)?);
        }
    }
    Ok(values)
}

// =========================================================================
// Tests
// =========================================================================
