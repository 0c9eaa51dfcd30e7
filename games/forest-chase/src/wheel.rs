use chase_engine::{
    BodyDesc, BodyHandle, ColliderDesc, ColliderMaterial, Control, InputSnapshot, PhysicsWorld,
    RenderPose,
};
use glam::Vec2;
use serde::Deserialize;

use crate::layers::{MeshKind, VEHICLE_FILTER};

/// Tyre model parameters for one wheel.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub max_forward_speed: f32,
    pub max_backward_speed: f32,
    pub max_drive_force: f32,
    pub max_lateral_impulse: f32,
    /// Rolling resistance coefficient `k` in `-k * forward_velocity`.
    pub drag: f32,
    /// Fraction of spin cancelled per tick.
    pub angular_damping: f32,
    pub half_width: f32,
    pub half_length: f32,
    pub density: f32,
    /// Forward speed that turns the render mesh by one radian per frame.
    pub spin_divisor: f32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            max_forward_speed: 300.0,
            max_backward_speed: -40.0,
            max_drive_force: 200.0,
            max_lateral_impulse: 15.0,
            drag: 0.02,
            angular_damping: 0.1,
            half_width: 0.5,
            half_length: 1.25,
            density: 1.0,
            spin_divisor: 110.0,
        }
    }
}

/// One tyre: a small dynamic box that resists sliding sideways and pushes
/// itself along its own forward axis (local `+Y`).
pub struct Wheel {
    body: BodyHandle,
    config: WheelConfig,
    spin: f32,
}

impl Wheel {
    pub fn spawn(
        physics: &mut PhysicsWorld,
        position: Vec2,
        heading: f32,
        config: &WheelConfig,
    ) -> Self {
        let body = physics.create_body(
            &BodyDesc::dynamic()
                .with_position(position)
                .with_rotation(heading),
        );
        physics.add_collider(
            body,
            &ColliderDesc::Cuboid {
                half_width: config.half_width,
                half_height: config.half_length,
            },
            VEHICLE_FILTER,
            ColliderMaterial::with_density(config.density),
        );

        Self {
            body,
            config: config.clone(),
            spin: 0.0,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn spin(&self) -> f32 {
        self.spin
    }

    fn forward_normal(&self, physics: &PhysicsWorld) -> Vec2 {
        physics.world_vector(self.body, Vec2::Y)
    }

    fn lateral_normal(&self, physics: &PhysicsWorld) -> Vec2 {
        physics.world_vector(self.body, Vec2::X)
    }

    /// Signed speed along the wheel's current heading.
    pub fn forward_speed(&self, physics: &PhysicsWorld) -> f32 {
        self.forward_normal(physics)
            .dot(physics.linear_velocity(self.body))
    }

    pub fn forward_velocity(&self, physics: &PhysicsWorld) -> Vec2 {
        self.forward_normal(physics) * self.forward_speed(physics)
    }

    pub fn lateral_velocity(&self, physics: &PhysicsWorld) -> Vec2 {
        let normal = self.lateral_normal(physics);
        normal * normal.dot(physics.linear_velocity(self.body))
    }

    /// Cancel sideways slip (up to the grip limit), damp spin and apply rolling
    /// drag. Returns the lateral impulse that was applied.
    pub fn update_friction(&self, physics: &mut PhysicsWorld) -> Vec2 {
        let mut impulse = self.lateral_velocity(physics) * -physics.mass(self.body);
        let magnitude = impulse.length();
        if magnitude > self.config.max_lateral_impulse {
            impulse *= self.config.max_lateral_impulse / magnitude;
        }
        physics.apply_impulse(self.body, impulse);

        let spin_impulse = self.config.angular_damping
            * physics.inertia(self.body)
            * -physics.angular_velocity(self.body);
        physics.apply_angular_impulse(self.body, spin_impulse);

        let drag = self.forward_velocity(physics) * -self.config.drag;
        physics.apply_force(self.body, drag);

        impulse
    }

    /// Speed the wheel is trying to reach for the given controls.
    pub fn desired_speed(&self, input: InputSnapshot) -> f32 {
        if input.pressed(Control::Forward) {
            self.config.max_forward_speed
        } else if input.pressed(Control::Backward) {
            self.config.max_backward_speed
        } else {
            0.0
        }
    }

    /// Push toward the desired speed with a constant drive force.
    /// Returns the signed force applied along the forward axis.
    pub fn update_drive(&self, physics: &mut PhysicsWorld, input: InputSnapshot) -> f32 {
        let desired = self.desired_speed(input);
        let current = self.forward_speed(physics);

        let force = if desired > current {
            self.config.max_drive_force
        } else if desired < current {
            -self.config.max_drive_force
        } else {
            return 0.0;
        };

        let normal = self.forward_normal(physics);
        physics.apply_force(self.body, normal * force);
        force
    }

    pub fn update(&self, physics: &mut PhysicsWorld, input: InputSnapshot) {
        self.update_friction(physics);
        self.update_drive(physics, input);
    }

    /// Pose for this frame. Advances the rolling spin from forward speed.
    pub fn render(&mut self, physics: &PhysicsWorld) -> RenderPose {
        self.spin -= self.forward_speed(physics) / self.config.spin_divisor;
        let pos = physics.position(self.body);
        RenderPose::new(pos.x, pos.y, physics.angle(self.body))
            .with_spin(self.spin)
            .with_kind(MeshKind::Wheel.id())
    }

    pub(crate) fn dispose(&self, physics: &mut PhysicsWorld) {
        physics.remove_body(self.body);
    }
}
