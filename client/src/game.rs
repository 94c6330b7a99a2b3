//! Client-side view of the race, smoothed toward server snapshots

use shared::{ServerPacket, SlotPose, Snapshot, MAX_PLAYERS};
use std::sync::{Arc, Mutex};

pub const WINDOW_WIDTH: f32 = 800.0;
pub const WINDOW_HEIGHT: f32 = 600.0;

/// Rendered pose of one slot and the latest pose received for it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolatedSlot {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub target_x: f32,
    pub target_y: f32,
    pub target_angle: f32,
}

impl InterpolatedSlot {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            x,
            y,
            angle,
            target_x: x,
            target_y: y,
            target_angle: angle,
        }
    }

    pub fn set_target(&mut self, pose: &SlotPose) {
        self.target_x = pose.x;
        self.target_y = pose.y;
        self.target_angle = pose.angle;
    }

    /// Moves `factor` of the remaining way toward the target.
    ///
    /// The angle is treated as a plain scalar: going from just under 2π to
    /// just over 0 sweeps back through π rather than taking the short way.
    pub fn advance(&mut self, factor: f32) {
        self.x += (self.target_x - self.x) * factor;
        self.y += (self.target_y - self.y) * factor;
        self.angle += (self.target_angle - self.angle) * factor;
    }

    pub fn pose(&self) -> SlotPose {
        SlotPose {
            x: self.x,
            y: self.y,
            angle: self.angle,
        }
    }

    pub fn distance_to_target(&self) -> f32 {
        let dx = self.target_x - self.x;
        let dy = self.target_y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Everything the render loop needs from the network
pub struct ClientWorld {
    pub slots: [InterpolatedSlot; MAX_PLAYERS],
    /// Slot this client controls, once the server has said so
    pub local_slot: Option<u8>,
    pub snapshots_received: u64,
    interpolation_factor: f32,
}

/// Interpolation state shared between the network worker and the render loop
pub type SharedWorld = Arc<Mutex<ClientWorld>>;

impl ClientWorld {
    pub fn new(interpolation_factor: f32) -> Self {
        let start = InterpolatedSlot::new(WINDOW_WIDTH / 2.0, WINDOW_HEIGHT / 2.0, 0.0);
        Self {
            slots: [start; MAX_PLAYERS],
            local_slot: None,
            snapshots_received: 0,
            interpolation_factor,
        }
    }

    pub fn shared(interpolation_factor: f32) -> SharedWorld {
        Arc::new(Mutex::new(Self::new(interpolation_factor)))
    }

    pub fn apply_packet(&mut self, packet: &ServerPacket) {
        match packet {
            ServerPacket::SlotAssigned { slot } => self.local_slot = Some(*slot),
            ServerPacket::WorldState(snapshot) => self.apply_snapshot(snapshot),
        }
    }

    /// Replaces every slot's target; rendered poses are left alone.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        for (slot, pose) in self.slots.iter_mut().zip(snapshot.slots.iter()) {
            slot.set_target(pose);
        }
        self.snapshots_received += 1;
    }

    /// One render frame of smoothing for every slot
    pub fn advance(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.advance(self.interpolation_factor);
        }
    }

    pub fn poses(&self) -> [SlotPose; MAX_PLAYERS] {
        self.slots.map(|slot| slot.pose())
    }
}
