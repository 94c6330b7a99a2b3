//! Binary wire format for client/server datagrams
//!
//! Every datagram starts with a one-byte tag. Snapshot bodies are written with
//! bincode configured for big-endian fixed-width encoding, so each `f32` lands
//! on the wire as its 4-byte big-endian IEEE-754 image with no framing.

use crate::{InputFlags, MAX_PLAYERS, SPAWN_X, SPAWN_Y};
use bincode::Options;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const TAG_INPUT: u8 = 0x01;
pub const TAG_SLOT_ASSIGNED: u8 = 0x02;
pub const TAG_WORLD_STATE: u8 = 0x03;

/// Minimum input datagram size; trailing bytes are ignored.
pub const INPUT_PACKET_LEN: usize = 2;
pub const SLOT_PACKET_LEN: usize = 2;
/// Tag byte plus `(x, y, angle)` as three `f32` per slot.
pub const WORLD_STATE_PACKET_LEN: usize = 1 + 12 * MAX_PLAYERS;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty datagram")]
    Empty,

    #[error("unknown tag 0x{0:02x}")]
    UnknownTag(u8),

    #[error("tag 0x{tag:02x} expects {expected} bytes, got {actual}")]
    BadLength {
        tag: u8,
        expected: usize,
        actual: usize,
    },

    #[error("payload codec error: {0}")]
    Codec(#[from] bincode::Error),
}

fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_big_endian()
        .with_fixint_encoding()
}

/// Position and heading of one slot as broadcast by the server
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotPose {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

impl SlotPose {
    /// Sentinel emitted for slots that have no body yet.
    pub const VACANT: SlotPose = SlotPose {
        x: 100.0,
        y: 100.0,
        angle: 0.0,
    };

    pub const SPAWN: SlotPose = SlotPose {
        x: SPAWN_X,
        y: SPAWN_Y,
        angle: 0.0,
    };
}

/// The full per-tick world state, one pose per slot in slot order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub slots: [SlotPose; MAX_PLAYERS],
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            slots: [SlotPose::VACANT; MAX_PLAYERS],
        }
    }
}

/// Datagrams sent from client to server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientPacket {
    Input(InputFlags),
}

impl ClientPacket {
    pub fn encode(&self) -> Vec<u8> {
        match self {
            ClientPacket::Input(flags) => vec![TAG_INPUT, flags.bits()],
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let (&tag, body) = data.split_first().ok_or(ProtocolError::Empty)?;
        match tag {
            TAG_INPUT => match body.first() {
                Some(&bits) => Ok(ClientPacket::Input(InputFlags::from_bits(bits))),
                None => Err(ProtocolError::BadLength {
                    tag,
                    expected: INPUT_PACKET_LEN,
                    actual: data.len(),
                }),
            },
            _ => Err(ProtocolError::UnknownTag(tag)),
        }
    }
}

/// Datagrams sent from server to client
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServerPacket {
    /// Tells a newly seen endpoint which slot it controls.
    SlotAssigned { slot: u8 },
    WorldState(Snapshot),
}

impl ServerPacket {
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        match self {
            ServerPacket::SlotAssigned { slot } => Ok(vec![TAG_SLOT_ASSIGNED, *slot]),
            ServerPacket::WorldState(snapshot) => {
                let mut data = Vec::with_capacity(WORLD_STATE_PACKET_LEN);
                data.push(TAG_WORLD_STATE);
                wire_options().serialize_into(&mut data, &snapshot.slots)?;
                Ok(data)
            }
        }
    }

    /// Decodes a server datagram. Lengths must match the tag exactly.
    pub fn decode(data: &[u8]) -> Result<Self, ProtocolError> {
        let (&tag, body) = data.split_first().ok_or(ProtocolError::Empty)?;
        let expected = match tag {
            TAG_SLOT_ASSIGNED => SLOT_PACKET_LEN,
            TAG_WORLD_STATE => WORLD_STATE_PACKET_LEN,
            _ => return Err(ProtocolError::UnknownTag(tag)),
        };
        if data.len() != expected {
            return Err(ProtocolError::BadLength {
                tag,
                expected,
                actual: data.len(),
            });
        }

        if tag == TAG_SLOT_ASSIGNED {
            return Ok(ServerPacket::SlotAssigned { slot: body[0] });
        }
        let slots: [SlotPose; MAX_PLAYERS] = wire_options().deserialize(body)?;
        Ok(ServerPacket::WorldState(Snapshot { slots }))
    }
}
