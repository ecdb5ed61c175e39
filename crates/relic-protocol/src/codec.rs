//! Codec trait and implementations for turning messages into bytes.
//!
//! The session layer never touches bytes; it hands a [`Message`] to
//! something that implements [`Codec`] and gets a `Vec<u8>` back (and the
//! reverse on receive).
//!
//! [`BinaryCodec`] is the real wire format the game server speaks.
//! [`JsonCodec`] renders the same messages as JSON, which is handy for
//! logging and for poking at a session from a debugging tool.

use crate::wire::{
    self, Layout, MAX_PACKET_SIZE, MAX_PLAYERS_IN_GAME, OPCODE_SIZE, Reader, Value,
};
use crate::{
    ConnectResponse, Direction, Message, NetId, PlayerSlot, ProtocolError,
    ProtocolVersion, SelfField, SelfRef,
};

/// Encodes messages to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` so one codec can live inside a long-running
/// Tokio task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a message.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidMessage` if the message can't be
    /// represented in this format.
    fn encode(&self, message: &Message) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes a message that travelled in `direction`.
    ///
    /// # Errors
    /// Returns `ProtocolError::Malformed` if the bytes are too short for
    /// their opcode. Unknown opcodes are *not* an error.
    fn decode(
        &self,
        direction: Direction,
        data: &[u8],
    ) -> Result<Message, ProtocolError>;
}

// ---------------------------------------------------------------------------
// BinaryCodec
// ---------------------------------------------------------------------------

/// The little-endian, fixed-layout wire format.
///
/// ## Example
///
/// ```rust
/// use relic_protocol::{BinaryCodec, Codec, Direction, Message, ProtocolVersion};
///
/// let codec = BinaryCodec::new(ProtocolVersion::Compact);
/// let request = Message::MoveCommand { player_id: None, x: 3.0, y: 4.0 };
///
/// let bytes = codec.encode(&request).unwrap();
/// assert_eq!(bytes.len(), 18);
///
/// let decoded = codec.decode(Direction::ClientToServer, &bytes).unwrap();
/// assert_eq!(decoded, request);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryCodec {
    version: ProtocolVersion,
}

impl BinaryCodec {
    pub fn new(version: ProtocolVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    fn layout_for(&self, opcode: u16, direction: Direction) -> Result<Layout, ProtocolError> {
        wire::layout(opcode, direction, self.version).ok_or_else(|| {
            ProtocolError::InvalidMessage(format!(
                "no layout for opcode {opcode} ({direction})"
            ))
        })
    }

    fn flatten(&self, message: &Message) -> Result<(Layout, Vec<Value>), ProtocolError> {
        match message {
            Message::Ping => Ok((
                self.layout_for(wire::OPCODE_PING, Direction::ClientToServer)?,
                Vec::new(),
            )),
            Message::MoveCommand { player_id: None, x, y } => Ok((
                self.layout_for(wire::OPCODE_MOVE, Direction::ClientToServer)?,
                vec![Value::F64(*x), Value::F64(*y)],
            )),
            Message::MoveCommand {
                player_id: Some(id),
                x,
                y,
            } => Ok((
                self.layout_for(wire::OPCODE_MOVE, Direction::ServerToClient)?,
                vec![Value::NetId(*id), Value::F64(*x), Value::F64(*y)],
            )),
            Message::ConnectRequest => Ok((
                self.layout_for(wire::OPCODE_CONNECT, Direction::ClientToServer)?,
                vec![Value::Placeholder],
            )),
            Message::ConnectResponse(resp) => Ok((
                self.layout_for(wire::OPCODE_CONNECT, Direction::ServerToClient)?,
                self.flatten_connect_response(resp)?,
            )),
            // Unknown is handled by the caller; it has no layout.
            Message::Unknown { opcode, .. } => Err(ProtocolError::InvalidMessage(
                format!("opcode {opcode} has no layout"),
            )),
        }
    }

    fn flatten_connect_response(
        &self,
        resp: &ConnectResponse,
    ) -> Result<Vec<Value>, ProtocolError> {
        let mut values = Vec::with_capacity(MAX_PLAYERS_IN_GAME * 4 + 3);
        values.extend(resp.roster.iter().map(|s| Value::NetId(s.id)));
        values.extend(resp.roster.iter().map(|s| Value::Name(s.name.clone())));
        for slot in &resp.roster {
            values.push(Value::F64(slot.x));
            values.push(Value::F64(slot.y));
        }
        values.push(Value::NetId(resp.current_turn));
        values.push(Value::Flag(resp.game_ongoing));
        values.push(match (resp.self_ref, self.version.self_field()) {
            (SelfRef::Slot(i), SelfField::SlotIndex) => Value::SlotIndex(i),
            (SelfRef::Id(id), SelfField::Id) => Value::NetId(id),
            (other, _) => {
                return Err(ProtocolError::InvalidMessage(format!(
                    "{other:?} can't be sent with protocol revision {}",
                    self.version.revision()
                )));
            }
        });
        Ok(values)
    }

    fn unflatten(&self, layout: &Layout, values: Vec<Value>) -> Result<Message, ProtocolError> {
        let mut values = values.into_iter();
        let message = match (layout.opcode, layout.direction) {
            (wire::OPCODE_PING, _) => Message::Ping,
            (wire::OPCODE_MOVE, Direction::ClientToServer) => Message::MoveCommand {
                player_id: None,
                x: next_f64(&mut values)?,
                y: next_f64(&mut values)?,
            },
            (wire::OPCODE_MOVE, Direction::ServerToClient) => Message::MoveCommand {
                player_id: Some(next_net_id(&mut values)?),
                x: next_f64(&mut values)?,
                y: next_f64(&mut values)?,
            },
            (wire::OPCODE_CONNECT, Direction::ClientToServer) => Message::ConnectRequest,
            (wire::OPCODE_CONNECT, Direction::ServerToClient) => {
                Message::ConnectResponse(unflatten_connect_response(&mut values)?)
            }
            (opcode, direction) => {
                return Err(ProtocolError::InvalidMessage(format!(
                    "no message for opcode {opcode} ({direction})"
                )));
            }
        };
        Ok(message)
    }
}

fn unflatten_connect_response(
    values: &mut impl Iterator<Item = Value>,
) -> Result<ConnectResponse, ProtocolError> {
    let mut roster: [PlayerSlot; MAX_PLAYERS_IN_GAME] = Default::default();
    for slot in roster.iter_mut() {
        slot.id = next_net_id(values)?;
    }
    for slot in roster.iter_mut() {
        slot.name = match values.next() {
            Some(Value::Name(name)) => name,
            other => return Err(unexpected("name", other)),
        };
    }
    for slot in roster.iter_mut() {
        slot.x = next_f64(values)?;
        slot.y = next_f64(values)?;
    }
    let current_turn = next_net_id(values)?;
    let game_ongoing = match values.next() {
        Some(Value::Flag(b)) => b,
        other => return Err(unexpected("flag", other)),
    };
    let self_ref = match values.next() {
        Some(Value::SlotIndex(i)) => SelfRef::Slot(i),
        Some(Value::NetId(id)) => SelfRef::Id(id),
        other => return Err(unexpected("self reference", other)),
    };
    Ok(ConnectResponse {
        roster,
        current_turn,
        game_ongoing,
        self_ref,
    })
}

fn next_f64(values: &mut impl Iterator<Item = Value>) -> Result<f64, ProtocolError> {
    match values.next() {
        Some(Value::F64(v)) => Ok(v),
        other => Err(unexpected("f64", other)),
    }
}

fn next_net_id(values: &mut impl Iterator<Item = Value>) -> Result<NetId, ProtocolError> {
    match values.next() {
        Some(Value::NetId(id)) => Ok(id),
        other => Err(unexpected("identifier", other)),
    }
}

fn unexpected(wanted: &str, got: Option<Value>) -> ProtocolError {
    ProtocolError::InvalidMessage(format!("expected {wanted}, got {got:?}"))
}

impl Codec for BinaryCodec {
    fn encode(&self, message: &Message) -> Result<Vec<u8>, ProtocolError> {
        let mut out = Vec::new();
        match message {
            Message::Unknown { opcode, payload } => {
                if wire::is_known_opcode(*opcode) {
                    return Err(ProtocolError::InvalidMessage(format!(
                        "opcode {opcode} is known; send the typed message instead"
                    )));
                }
                out.reserve(OPCODE_SIZE + payload.len());
                out.extend_from_slice(&opcode.to_le_bytes());
                out.extend_from_slice(payload);
            }
            _ => {
                let (layout, values) = self.flatten(message)?;
                wire::write_fields(&layout, self.version, &values, &mut out)?;
            }
        }

        if out.len() > MAX_PACKET_SIZE {
            return Err(ProtocolError::InvalidMessage(format!(
                "encoded message is {} bytes, max {MAX_PACKET_SIZE}",
                out.len()
            )));
        }
        Ok(out)
    }

    fn decode(
        &self,
        direction: Direction,
        data: &[u8],
    ) -> Result<Message, ProtocolError> {
        let mut reader = Reader::new(data);
        let opcode = reader.read_opcode()?;

        let Some(layout) = wire::layout(opcode, direction, self.version) else {
            return Ok(Message::Unknown {
                opcode,
                payload: reader.rest().to_vec(),
            });
        };

        let values = wire::read_fields(&layout, self.version, &mut reader)?;
        if reader.remaining() > 0 {
            tracing::trace!(
                opcode,
                trailing = reader.remaining(),
                "ignoring trailing bytes"
            );
        }
        self.unflatten(&layout, values)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that renders messages as JSON (via `serde_json`).
///
/// Not something the game server understands; it's for logs, fixtures and
/// debugging tools. Direction is irrelevant because JSON is self-describing.
///
/// JSON has no NaN or infinity, so messages carrying non-finite
/// coordinates are rejected on encode with [`ProtocolError::InvalidMessage`].
/// [`BinaryCodec`] carries them bit-exact.
///
/// This is behind the `json` feature flag (enabled by default).
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode(&self, message: &Message) -> Result<Vec<u8>, ProtocolError> {
        if has_non_finite_coords(message) {
            return Err(ProtocolError::InvalidMessage(
                "non-finite coordinate cannot be written as JSON".into(),
            ));
        }
        serde_json::to_vec(message).map_err(ProtocolError::Encode)
    }

    fn decode(
        &self,
        _direction: Direction,
        data: &[u8],
    ) -> Result<Message, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(feature = "json")]
fn has_non_finite_coords(message: &Message) -> bool {
    let bad = |x: f64, y: f64| !x.is_finite() || !y.is_finite();
    match message {
        Message::MoveCommand { x, y, .. } => bad(*x, *y),
        Message::ConnectResponse(response) => response.roster.iter().any(|s| bad(s.x, s.y)),
        _ => false,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn roster_with(slots: &[(usize, PlayerSlot)], empty_id: NetId) -> [PlayerSlot; 8] {
        let mut roster: [PlayerSlot; 8] = Default::default();
        for slot in roster.iter_mut() {
            slot.id = empty_id;
        }
        for (i, slot) in slots {
            roster[*i] = slot.clone();
        }
        roster
    }

    fn compact_response() -> Message {
        Message::ConnectResponse(ConnectResponse {
            roster: roster_with(
                &[
                    (0, PlayerSlot::new(NetId(7), "Bob", 1.5, -2.25)),
                    (3, PlayerSlot::new(NetId(12), "Alice", 0.1, 0.2)),
                ],
                NetId(-1),
            ),
            current_turn: NetId(7),
            game_ongoing: true,
            self_ref: SelfRef::Id(NetId(7)),
        })
    }

    fn legacy_response() -> Message {
        Message::ConnectResponse(ConnectResponse {
            roster: roster_with(
                &[(1, PlayerSlot::new(NetId(1 << 40), "Carol", -1.6, 1.0))],
                NetId(0),
            ),
            current_turn: NetId(0),
            game_ongoing: false,
            self_ref: SelfRef::Slot(1),
        })
    }

    // =====================================================================
    // Exact bytes
    // =====================================================================

    #[test]
    fn test_ping_encodes_to_two_zero_bytes() {
        let codec = BinaryCodec::new(ProtocolVersion::Legacy);
        assert_eq!(codec.encode(&Message::Ping).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_move_request_bytes_have_no_identifier() {
        let codec = BinaryCodec::new(ProtocolVersion::Legacy);
        let bytes = codec
            .encode(&Message::MoveCommand {
                player_id: None,
                x: 3.0,
                y: 4.0,
            })
            .unwrap();

        let mut expected = vec![1, 0];
        expected.extend_from_slice(&3.0f64.to_le_bytes());
        expected.extend_from_slice(&4.0f64.to_le_bytes());
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_move_broadcast_bytes_compact() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let bytes = codec
            .encode(&Message::MoveCommand {
                player_id: Some(NetId(-2)),
                x: 0.5,
                y: -0.5,
            })
            .unwrap();
        assert_eq!(&bytes[..4], &[1, 0, 0xFE, 0xFF]);
        assert_eq!(bytes.len(), 20);
    }

    #[test]
    fn test_connect_request_is_opcode_plus_placeholder() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        assert_eq!(codec.encode(&Message::ConnectRequest).unwrap(), vec![2, 0, 0]);
    }

    #[test]
    fn test_connect_response_field_offsets_compact() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let bytes = codec.encode(&compact_response()).unwrap();

        // ids block starts right after the opcode.
        assert_eq!(&bytes[2..4], &7i16.to_le_bytes());
        assert_eq!(&bytes[2 + 3 * 2..2 + 4 * 2], &12i16.to_le_bytes());
        // names block follows the 8 ids.
        let names = 2 + 8 * 2;
        assert_eq!(&bytes[names..names + 3], b"Bob");
        assert_eq!(bytes[names + 3], 0);
        assert_eq!(&bytes[names + 3 * 32..names + 3 * 32 + 5], b"Alice");
        // coords follow the names.
        let coords = names + 8 * 32;
        assert_eq!(&bytes[coords..coords + 8], &1.5f64.to_le_bytes());
        assert_eq!(&bytes[coords + 8..coords + 16], &(-2.25f64).to_le_bytes());
        // trailer: turn, flag, self id.
        let trailer = coords + 8 * 16;
        assert_eq!(&bytes[trailer..trailer + 2], &7i16.to_le_bytes());
        assert_eq!(bytes[trailer + 2], 1);
        assert_eq!(&bytes[trailer + 3..trailer + 5], &7i16.to_le_bytes());
        assert_eq!(bytes.len(), trailer + 5);
    }

    // =====================================================================
    // Round trips
    // =====================================================================

    #[test]
    fn test_round_trip_all_client_messages() {
        for version in [ProtocolVersion::Legacy, ProtocolVersion::Compact] {
            let codec = BinaryCodec::new(version);
            for msg in [
                Message::Ping,
                Message::ConnectRequest,
                Message::MoveCommand {
                    player_id: None,
                    x: 3.0,
                    y: 4.0,
                },
            ] {
                let bytes = codec.encode(&msg).unwrap();
                let back = codec.decode(Direction::ClientToServer, &bytes).unwrap();
                assert_eq!(back, msg, "{version:?}");
            }
        }
    }

    #[test]
    fn test_round_trip_connect_response_both_versions() {
        let cases = [
            (ProtocolVersion::Compact, compact_response()),
            (ProtocolVersion::Legacy, legacy_response()),
        ];
        for (version, msg) in cases {
            let codec = BinaryCodec::new(version);
            let bytes = codec.encode(&msg).unwrap();
            let back = codec.decode(Direction::ServerToClient, &bytes).unwrap();
            assert_eq!(back, msg, "{version:?}");
        }
    }

    #[test]
    fn test_round_trip_preserves_float_bits() {
        let codec = BinaryCodec::new(ProtocolVersion::Legacy);
        for v in [
            -0.0f64,
            f64::MIN_POSITIVE,
            f64::from_bits(1),
            f64::INFINITY,
            f64::NAN,
            0.1 + 0.2,
        ] {
            let msg = Message::MoveCommand {
                player_id: Some(NetId(5)),
                x: v,
                y: -v,
            };
            let bytes = codec.encode(&msg).unwrap();
            let Message::MoveCommand { x, y, .. } =
                codec.decode(Direction::ServerToClient, &bytes).unwrap()
            else {
                panic!("wrong variant");
            };
            assert_eq!(x.to_bits(), v.to_bits());
            assert_eq!(y.to_bits(), (-v).to_bits());
        }
    }

    #[test]
    fn test_round_trip_unknown_opcode() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let msg = Message::Unknown {
            opcode: 77,
            payload: vec![9, 8, 7],
        };
        let bytes = codec.encode(&msg).unwrap();
        assert_eq!(bytes, vec![77, 0, 9, 8, 7]);
        assert_eq!(codec.decode(Direction::ServerToClient, &bytes).unwrap(), msg);
    }

    // =====================================================================
    // Decoding edge cases
    // =====================================================================

    #[test]
    fn test_every_short_prefix_is_malformed() {
        let codec = BinaryCodec::new(ProtocolVersion::Legacy);
        let full = codec.encode(&legacy_response()).unwrap();
        for len in 0..full.len() {
            let err = codec
                .decode(Direction::ServerToClient, &full[..len])
                .unwrap_err();
            assert!(err.is_malformed(), "len {len}: {err}");
        }
    }

    #[test]
    fn test_short_move_broadcast_is_malformed() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let err = codec
            .decode(Direction::ServerToClient, &[1, 0, 7, 0, 0])
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::Malformed {
                opcode: Some(1),
                needed: 20,
                available: 5
            }
        ));
    }

    #[test]
    fn test_empty_buffer_is_malformed() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let err = codec.decode(Direction::ServerToClient, &[]).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_unknown_opcode_decodes_instead_of_failing() {
        let codec = BinaryCodec::new(ProtocolVersion::Legacy);
        let msg = codec.decode(Direction::ServerToClient, &[3, 0]).unwrap();
        assert_eq!(
            msg,
            Message::Unknown {
                opcode: 3,
                payload: vec![]
            }
        );
    }

    #[test]
    fn test_trailing_bytes_are_ignored() {
        let codec = BinaryCodec::new(ProtocolVersion::Legacy);
        let msg = codec
            .decode(Direction::ServerToClient, &[0, 0, 0xAA, 0xBB])
            .unwrap();
        assert_eq!(msg, Message::Ping);
    }

    #[test]
    fn test_direction_selects_move_layout() {
        // The same 18 bytes are a full request going up, but too short for
        // a Legacy broadcast coming down (which needs 26).
        let codec = BinaryCodec::new(ProtocolVersion::Legacy);
        let bytes = codec
            .encode(&Message::MoveCommand {
                player_id: None,
                x: 1.0,
                y: 2.0,
            })
            .unwrap();
        assert!(codec.decode(Direction::ClientToServer, &bytes).is_ok());
        assert!(
            codec
                .decode(Direction::ServerToClient, &bytes)
                .unwrap_err()
                .is_malformed()
        );
    }

    #[test]
    fn test_name_without_nul_decodes_full_window() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let long = "x".repeat(32);
        let Message::ConnectResponse(mut resp) = compact_response() else {
            unreachable!()
        };
        resp.roster[0].name = long.clone();
        let bytes = codec.encode(&Message::ConnectResponse(resp)).unwrap();
        let Message::ConnectResponse(back) =
            codec.decode(Direction::ServerToClient, &bytes).unwrap()
        else {
            panic!("wrong variant");
        };
        assert_eq!(back.roster[0].name, long);
    }

    // =====================================================================
    // Encoding rejections
    // =====================================================================

    #[test]
    fn test_encode_rejects_long_name() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let Message::ConnectResponse(mut resp) = compact_response() else {
            unreachable!()
        };
        resp.roster[2].name = "y".repeat(33);
        let err = codec.encode(&Message::ConnectResponse(resp)).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_encode_rejects_nul_in_name() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let Message::ConnectResponse(mut resp) = compact_response() else {
            unreachable!()
        };
        resp.roster[0].name = "Bo\0b".into();
        assert!(codec.encode(&Message::ConnectResponse(resp)).is_err());
    }

    #[test]
    fn test_encode_rejects_id_too_wide_for_compact() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let err = codec
            .encode(&Message::MoveCommand {
                player_id: Some(NetId(70_000)),
                x: 0.0,
                y: 0.0,
            })
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_encode_rejects_self_ref_of_wrong_kind() {
        let codec = BinaryCodec::new(ProtocolVersion::Legacy);
        // compact_response uses SelfRef::Id, Legacy wants a slot index.
        let err = codec.encode(&compact_response()).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_encode_rejects_unknown_with_known_opcode() {
        let codec = BinaryCodec::new(ProtocolVersion::Legacy);
        let err = codec
            .encode(&Message::Unknown {
                opcode: 1,
                payload: vec![],
            })
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_encode_rejects_oversized_unknown() {
        let codec = BinaryCodec::new(ProtocolVersion::Legacy);
        let err = codec
            .encode(&Message::Unknown {
                opcode: 99,
                payload: vec![0; MAX_PACKET_SIZE],
            })
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    // =====================================================================
    // JsonCodec
    // =====================================================================

    #[cfg(feature = "json")]
    #[test]
    fn test_json_codec_round_trip() {
        let codec = JsonCodec;
        let msg = compact_response();
        let bytes = codec.encode(&msg).unwrap();
        let back = codec.decode(Direction::ServerToClient, &bytes).unwrap();
        assert_eq!(back, msg);
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_codec_rejects_garbage() {
        let err = JsonCodec
            .decode(Direction::ServerToClient, b"not json at all")
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_codec_rejects_non_finite_coords() {
        let moved = Message::MoveCommand {
            player_id: Some(NetId(7)),
            x: f64::NAN,
            y: 0.0,
        };
        let err = JsonCodec.encode(&moved).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));

        let Message::ConnectResponse(mut response) = compact_response() else {
            unreachable!()
        };
        response.roster[0].y = f64::INFINITY;
        let err = JsonCodec
            .encode(&Message::ConnectResponse(response))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
    }

    #[test]
    fn test_binary_codec_keeps_non_finite_coords() {
        let codec = BinaryCodec::new(ProtocolVersion::Compact);
        let moved = Message::MoveCommand {
            player_id: Some(NetId(7)),
            x: f64::INFINITY,
            y: f64::NEG_INFINITY,
        };
        let bytes = codec.encode(&moved).unwrap();
        assert_eq!(codec.decode(Direction::ServerToClient, &bytes).unwrap(), moved);
    }
}
