use macroquad::prelude::*;
use shared::{SlotPose, MAX_PLAYERS};

const VEHICLE_LENGTH: f32 = 24.0;
const VEHICLE_WIDTH: f32 = 14.0;

/// Where and how a slot is drawn on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPose {
    pub x: f32,
    pub y: f32,
    /// Clockwise rotation in degrees, as sprite APIs expect
    pub rotation: f32,
}

/// Maps a y-up world pose onto the y-down screen of the given height.
pub fn screen_pose(pose: &SlotPose, screen_height: f32) -> ScreenPose {
    ScreenPose {
        x: pose.x,
        y: screen_height - pose.y,
        rotation: -pose.angle.to_degrees(),
    }
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub local_slot: Option<u8>,
    pub connected: bool,
    pub snapshots_received: u64,
}

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: f32, height: f32) -> Self {
        Renderer { width, height }
    }

    pub fn render(&mut self, poses: &[SlotPose; MAX_PLAYERS], config: RenderConfig) {
        clear_background(Color::from_rgba(59, 122, 87, 255));

        for (slot, pose) in poses.iter().enumerate() {
            let is_local = config.local_slot == Some(slot as u8);
            let color = if is_local {
                GREEN
            } else {
                Color::from_rgba(255, 68, 68, 255)
            };
            self.draw_vehicle(&screen_pose(pose, self.height), color);
        }

        self.draw_ui(&config);
    }

    fn draw_vehicle(&mut self, pose: &ScreenPose, color: Color) {
        let heading = pose.rotation.to_radians();
        let forward = vec2(heading.cos(), heading.sin());
        let side = vec2(-forward.y, forward.x);
        let center = vec2(pose.x, pose.y);

        let nose = center + forward * (VEHICLE_LENGTH / 2.0);
        let tail = center - forward * (VEHICLE_LENGTH / 2.0);
        let left = tail + side * (VEHICLE_WIDTH / 2.0);
        let right = tail - side * (VEHICLE_WIDTH / 2.0);

        draw_triangle(nose, left, right, color);
        draw_triangle_lines(nose, left, right, 1.5, WHITE);
    }

    fn draw_ui(&mut self, config: &RenderConfig) {
        let connection_color = if config.connected { GREEN } else { RED };
        draw_rectangle(10.0, 10.0, 8.0, 8.0, connection_color);
        draw_text("NET", 22.0, 18.0, 16.0, WHITE);

        let slot_text = match config.local_slot {
            Some(slot) => format!("slot {}", slot),
            None => "waiting for slot".to_string(),
        };
        draw_text(&slot_text, 10.0, 36.0, 16.0, WHITE);

        let snapshot_text = format!("{} snapshots", config.snapshots_received);
        draw_text(&snapshot_text, self.width - 120.0, 18.0, 16.0, WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_screen_pose_flips_y() {
        let pose = SlotPose {
            x: 120.0,
            y: 100.0,
            angle: 0.0,
        };
        let screen = screen_pose(&pose, 600.0);
        assert_eq!(screen.x, 120.0);
        assert_eq!(screen.y, 500.0);
        assert_eq!(screen.rotation, 0.0);
    }

    #[test]
    fn test_screen_pose_negates_angle_in_degrees() {
        let pose = SlotPose {
            x: 0.0,
            y: 0.0,
            angle: FRAC_PI_2,
        };
        assert_approx_eq!(screen_pose(&pose, 600.0).rotation, -90.0, 1e-4);
    }
}
