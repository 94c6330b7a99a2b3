//! Types and constants shared by the racing server and client
//!
//! Both sides agree on the slot count, the simulation rate and the binary
//! wire format defined in [`protocol`].

pub mod protocol;

pub use protocol::{ClientPacket, ProtocolError, ServerPacket, SlotPose, Snapshot};

/// Number of player slots; also fixes the size of every world-state packet.
pub const MAX_PLAYERS: usize = 4;
/// Server simulation ticks per second.
pub const SIM_FPS: u32 = 30;
/// Fixed simulation step in seconds.
pub const DT: f32 = 1.0 / SIM_FPS as f32;

/// Client input packets per second.
pub const SEND_RATE: f32 = 30.0;
pub const SEND_INTERVAL: f32 = 1.0 / SEND_RATE;

/// Fraction of the remaining distance to a target closed per render frame.
pub const INTERPOLATION_FACTOR: f32 = 0.2;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9999;

pub const SPAWN_X: f32 = 200.0;
pub const SPAWN_Y: f32 = 200.0;

pub const INPUT_UP: u8 = 0b0001;
pub const INPUT_LEFT: u8 = 0b0010;
pub const INPUT_RIGHT: u8 = 0b0100;
/// Never set by the stock client; decoded so the brake path stays reachable.
pub const INPUT_DOWN: u8 = 0b1000;

/// Held controls for one player, as carried in an input packet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputFlags {
    pub up: bool,
    pub left: bool,
    pub right: bool,
    pub down: bool,
}

impl InputFlags {
    /// Decodes a bitmask byte. Bits above `INPUT_DOWN` are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            up: bits & INPUT_UP != 0,
            left: bits & INPUT_LEFT != 0,
            right: bits & INPUT_RIGHT != 0,
            down: bits & INPUT_DOWN != 0,
        }
    }

    /// Encodes the flags back into a bitmask byte.
    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.up {
            bits |= INPUT_UP;
        }
        if self.left {
            bits |= INPUT_LEFT;
        }
        if self.right {
            bits |= INPUT_RIGHT;
        }
        if self.down {
            bits |= INPUT_DOWN;
        }
        bits
    }

    /// True when exactly one of left/right is held.
    pub fn is_turning(&self) -> bool {
        self.left != self.right
    }
}
