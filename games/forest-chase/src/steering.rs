use chase_engine::{Control, InputSnapshot, JointHandle, PhysicsWorld};
use serde::Deserialize;

use crate::terrain::TerrainError;

/// Front-axle steering limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Maximum wheel deflection, degrees.
    pub lock_angle: f32,
    /// Deflection rate, degrees per second.
    pub turn_rate: f32,
    /// Simulation ticks per second.
    pub tick_rate: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            lock_angle: 30.0,
            turn_rate: 320.0,
            tick_rate: 60.0,
        }
    }
}

impl SteeringConfig {
    /// The rate limit only converges on the lock when every value is positive.
    pub fn validate(&self) -> Result<(), TerrainError> {
        let positive = |value: f32| value.is_finite() && value > 0.0;
        if !positive(self.lock_angle) {
            return Err(TerrainError::InvalidConfig("lock angle must be positive"));
        }
        if !positive(self.turn_rate) {
            return Err(TerrainError::InvalidConfig("turn rate must be positive"));
        }
        if !positive(self.tick_rate) {
            return Err(TerrainError::InvalidConfig("tick rate must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SteerDirection {
    Left,
    Right,
    None,
}

impl SteerDirection {
    /// Right takes precedence when both directions are held.
    pub fn from_input(input: InputSnapshot) -> Self {
        if input.pressed(Control::Right) {
            SteerDirection::Right
        } else if input.pressed(Control::Left) {
            SteerDirection::Left
        } else {
            SteerDirection::None
        }
    }
}

/// Rate-limited steering for the two front wheel joints.
///
/// The commanded angle lives here rather than being read back from the joints,
/// so the rate limit holds exactly even while the solver lags behind.
pub struct SteeredAxle {
    joints: [JointHandle; 2],
    angle: f32,
    lock: f32,
    max_step: f32,
}

impl SteeredAxle {
    pub fn new(left: JointHandle, right: JointHandle, config: &SteeringConfig) -> Self {
        Self {
            joints: [left, right],
            angle: 0.0,
            lock: config.lock_angle.to_radians(),
            max_step: (config.turn_rate / config.tick_rate).to_radians(),
        }
    }

    /// Current commanded angle in radians. Positive turns left.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn lock(&self) -> f32 {
        self.lock
    }

    /// Largest angle change allowed in one tick, radians.
    pub fn max_step(&self) -> f32 {
        self.max_step
    }

    pub fn joints(&self) -> &[JointHandle; 2] {
        &self.joints
    }

    /// Move one rate-limited step toward the lock for `direction` and pin both
    /// joints at the result. Returns the new angle.
    pub fn steer(&mut self, physics: &mut PhysicsWorld, direction: SteerDirection) -> f32 {
        let desired = match direction {
            SteerDirection::Left => self.lock,
            SteerDirection::Right => -self.lock,
            SteerDirection::None => 0.0,
        };

        let delta = desired - self.angle;
        self.angle = if delta.abs() <= self.max_step {
            desired
        } else {
            self.angle + self.max_step.copysign(delta)
        };

        for joint in &self.joints {
            physics.set_joint_limits(joint, self.angle, self.angle);
        }
        self.angle
    }
}
