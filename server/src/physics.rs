//! Vehicle dynamics for every occupied slot
//!
//! Bodies are advanced with a fixed step and a force accumulator: inputs add
//! forces and adjust angular velocity, then [`PhysicsWorld::step`] integrates
//! everything at once. Nothing here reads the wall clock.

use log::warn;
use shared::{InputFlags, SlotPose, Snapshot, MAX_PLAYERS};

pub const THRUST_FORCE: f32 = 2800.0;
pub const PLAYER_MASS: f32 = 5.0;
/// Fraction of speed kept per second.
pub const PLAYER_DAMPING: f32 = 0.4;
pub const PLAYER_MAX_HORIZONTAL_SPEED: f32 = 2400.0;
pub const PLAYER_MAX_VERTICAL_SPEED: f32 = 2400.0;

/// Degrees per second.
pub const ROTATION_SPEED: f32 = 180.0;
pub const ANGULAR_DAMPING: f32 = 1.0;

pub const LEFT_TURN_THRUST_SCALE: f32 = 0.5;
pub const RIGHT_TURN_THRUST_SCALE: f32 = 0.2;
pub const BRAKE_THRUST_SCALE: f32 = 0.2;

/// Angular acceleration applied while a single turn key is held, in rad/s².
pub fn angular_torque() -> f32 {
    ROTATION_SPEED.to_radians()
}

///Represents a vector in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    ///Returns the magnitude of the vector.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    ///Returns the scaled vector.
    pub fn scale(&self, scalar: f32) -> Vector2 {
        Vector2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    ///Returns the sum of two vectors.
    pub fn add(&self, other: &Vector2) -> Vector2 {
        Vector2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Per-body constants; fixed when the body is created
#[derive(Debug, Clone, Copy)]
pub struct BodyConfig {
    pub mass: f32,
    pub damping: f32,
    pub max_horizontal_speed: f32,
    pub max_vertical_speed: f32,
}

impl Default for BodyConfig {
    fn default() -> Self {
        BodyConfig {
            mass: PLAYER_MASS,
            damping: PLAYER_DAMPING,
            max_horizontal_speed: PLAYER_MAX_HORIZONTAL_SPEED,
            max_vertical_speed: PLAYER_MAX_VERTICAL_SPEED,
        }
    }
}

///Represents a vehicle body with a force accumulator.
#[derive(Debug, Clone, Copy)]
pub struct RigidBody {
    pub position: Vector2,
    /// Heading in radians; 0 faces +x.
    pub angle: f32,
    pub velocity: Vector2,
    pub angular_velocity: f32,
    force: Vector2,
    config: BodyConfig,
}

impl RigidBody {
    pub fn new(position: Vector2, config: BodyConfig) -> Self {
        RigidBody {
            position,
            angle: 0.0,
            velocity: Vector2::default(),
            angular_velocity: 0.0,
            force: Vector2::default(),
            config,
        }
    }

    pub fn forward(&self) -> Vector2 {
        Vector2::from_angle(self.angle)
    }

    /// Adds a force through the centre of mass for the current step.
    pub fn apply_force(&mut self, force: Vector2) {
        self.force = self.force.add(&force);
    }

    /// Force accumulated since the last step.
    pub fn pending_force(&self) -> Vector2 {
        self.force
    }

    ///Integrates accumulated forces over `dt` and clears them.
    pub fn integrate(&mut self, dt: f32) {
        let damping = self.config.damping.powf(dt);
        let acceleration = self.force.scale(1.0 / self.config.mass);

        self.velocity = self.velocity.scale(damping).add(&acceleration.scale(dt));
        self.velocity.x = self.velocity.x.clamp(
            -self.config.max_horizontal_speed,
            self.config.max_horizontal_speed,
        );
        self.velocity.y = self
            .velocity
            .y
            .clamp(-self.config.max_vertical_speed, self.config.max_vertical_speed);
        self.angular_velocity *= damping;

        self.position = self.position.add(&self.velocity.scale(dt));
        self.angle += self.angular_velocity * dt;
        self.force = Vector2::default();
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.angle.is_finite()
            && self.angular_velocity.is_finite()
    }

    pub fn pose(&self) -> SlotPose {
        SlotPose {
            x: self.position.x,
            y: self.position.y,
            angle: self.angle,
        }
    }
}

/// Rigid-body state for all slots, stepped once per server tick
pub struct PhysicsWorld {
    bodies: [Option<RigidBody>; MAX_PLAYERS],
    spawn: Vector2,
    config: BodyConfig,
    dt: f32,
}

impl PhysicsWorld {
    pub fn new(dt: f32, spawn: Vector2) -> Self {
        Self {
            bodies: [None; MAX_PLAYERS],
            spawn,
            config: BodyConfig::default(),
            dt,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Creates a body at rest at the spawn point. Out-of-range slots are ignored.
    pub fn add_body(&mut self, slot: usize) {
        if let Some(entry) = self.bodies.get_mut(slot) {
            *entry = Some(RigidBody::new(self.spawn, self.config));
        }
    }

    pub fn body(&self, slot: usize) -> Option<&RigidBody> {
        self.bodies.get(slot).and_then(Option::as_ref)
    }

    pub fn body_mut(&mut self, slot: usize) -> Option<&mut RigidBody> {
        self.bodies.get_mut(slot).and_then(Option::as_mut)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.iter().flatten().count()
    }

    /// Turns and thrusts one body according to its held controls.
    pub fn apply_input(&mut self, slot: usize, input: InputFlags) {
        let dt = self.dt;
        let Some(body) = self.body_mut(slot) else {
            return;
        };

        if input.left && !input.right {
            body.angular_velocity += angular_torque() * dt;
        } else if input.right && !input.left {
            body.angular_velocity -= angular_torque() * dt;
        }
        body.angular_velocity *= (1.0 - ANGULAR_DAMPING * dt).max(0.0);

        let forward = body.forward();
        if input.up {
            // Turning bleeds thrust, and more so to the right.
            let scale = if input.left {
                LEFT_TURN_THRUST_SCALE
            } else if input.right {
                RIGHT_TURN_THRUST_SCALE
            } else {
                1.0
            };
            body.apply_force(forward.scale(THRUST_FORCE * scale));
        }
        if input.up && input.down {
            body.apply_force(forward.scale(THRUST_FORCE * BRAKE_THRUST_SCALE));
        }
    }

    /// Advances every body by one fixed step.
    ///
    /// A body whose state turns non-finite is put back at the spawn point at
    /// rest so one bad slot cannot poison the tick. Returns the reset slots.
    pub fn step(&mut self) -> Vec<usize> {
        let mut reset = Vec::new();
        for (slot, entry) in self.bodies.iter_mut().enumerate() {
            let Some(body) = entry else {
                continue;
            };
            body.integrate(self.dt);
            if !body.is_finite() {
                warn!("Slot {} produced a non-finite state, respawning", slot);
                *body = RigidBody::new(self.spawn, self.config);
                reset.push(slot);
            }
        }
        reset
    }

    pub fn pose(&self, slot: usize) -> Option<SlotPose> {
        self.body(slot).map(RigidBody::pose)
    }

    /// Poses for every slot, with the vacant sentinel where no body exists.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for (slot, pose) in snapshot.slots.iter_mut().enumerate() {
            if let Some(body) = self.body(slot) {
                *pose = body.pose();
            }
        }
        snapshot
    }
}
