//! Client input sampling with send-rate throttling

use macroquad::prelude::{is_key_pressed, is_key_released, KeyCode};
use shared::{ClientPacket, InputFlags};

/// Controls the local player can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Up,
    Left,
    Right,
}

impl Control {
    fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Up => Some(Control::Up),
            KeyCode::Left => Some(Control::Left),
            KeyCode::Right => Some(Control::Right),
            _ => None,
        }
    }
}

const WATCHED_KEYS: [KeyCode; 3] = [KeyCode::Up, KeyCode::Left, KeyCode::Right];

/// Tracks held keys and decides when the next input packet is due
///
/// Elapsed frame time accumulates until it reaches the send interval, at
/// which point one packet is emitted and the accumulator restarts from zero.
/// Overshoot is discarded, so a long stall yields one packet, not a burst.
pub struct InputSampler {
    up: bool,
    left: bool,
    right: bool,
    send_timer: f32,
    send_interval: f32,
}

impl InputSampler {
    pub fn new(send_interval: f32) -> Self {
        Self {
            up: false,
            left: false,
            right: false,
            send_timer: 0.0,
            send_interval,
        }
    }

    pub fn press(&mut self, control: Control) {
        self.set(control, true);
    }

    pub fn release(&mut self, control: Control) {
        self.set(control, false);
    }

    fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::Up => self.up = held,
            Control::Left => self.left = held,
            Control::Right => self.right = held,
        }
    }

    /// Applies this frame's key edges from macroquad
    pub fn poll_keyboard(&mut self) {
        for key in WATCHED_KEYS {
            let Some(control) = Control::from_key(key) else {
                continue;
            };
            if is_key_pressed(key) {
                self.press(control);
            }
            if is_key_released(key) {
                self.release(control);
            }
        }
    }

    pub fn flags(&self) -> InputFlags {
        InputFlags {
            up: self.up,
            left: self.left,
            right: self.right,
            down: false,
        }
    }

    /// Advances the send timer by one frame of `dt` seconds
    ///
    /// Returns the packet to send when the interval has elapsed.
    pub fn update(&mut self, dt: f32) -> Option<ClientPacket> {
        self.send_timer += dt;
        if self.send_timer < self.send_interval {
            return None;
        }

        self.send_timer = 0.0;
        Some(ClientPacket::Input(self.flags()))
    }
}
