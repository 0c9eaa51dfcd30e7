use chase_engine::{
    BodyDesc, BodyHandle, ColliderDesc, ColliderMaterial, InputSnapshot, JointHandle, PhysicsWorld,
    PoseBuffer, RenderPose, RevoluteDesc,
};
use glam::Vec2;
use serde::Deserialize;

use crate::layers::{MeshKind, VEHICLE_FILTER};
use crate::steering::{SteerDirection, SteeredAxle, SteeringConfig};
use crate::wheel::{Wheel, WheelConfig};

/// Chassis geometry and wheel placement.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub half_width: f32,
    pub half_length: f32,
    pub density: f32,
    /// Chassis-local wheel anchors: front-left, front-right, rear-left, rear-right.
    pub anchors: [[f32; 2]; 4],
    /// Spawn position in world space.
    pub start: [f32; 2],
    /// Spawn heading in radians.
    pub heading: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            half_width: 3.0,
            half_length: 5.0,
            density: 1.0,
            anchors: [[-3.0, 3.5], [3.0, 3.5], [-3.0, -3.5], [3.0, -3.5]],
            start: [0.0, 0.0],
            heading: 0.0,
        }
    }
}

pub const FRONT_LEFT: usize = 0;
pub const FRONT_RIGHT: usize = 1;
pub const REAR_LEFT: usize = 2;
pub const REAR_RIGHT: usize = 3;

/// The player's car: a chassis with four hinged wheels, the front pair steered.
pub struct Vehicle {
    chassis: BodyHandle,
    wheels: [Wheel; 4],
    axle: SteeredAxle,
    disposed: bool,
}

impl Vehicle {
    pub fn spawn(
        physics: &mut PhysicsWorld,
        config: &VehicleConfig,
        wheel: &WheelConfig,
        steering: &SteeringConfig,
    ) -> Self {
        let start = Vec2::from(config.start);
        let chassis = physics.create_body(
            &BodyDesc::dynamic()
                .with_position(start)
                .with_rotation(config.heading),
        );
        physics.add_collider(
            chassis,
            &ColliderDesc::Cuboid {
                half_width: config.half_width,
                half_height: config.half_length,
            },
            VEHICLE_FILTER,
            ColliderMaterial::with_density(config.density),
        );

        let wheels = config.anchors.map(|anchor| {
            let at = physics.world_point(chassis, Vec2::from(anchor));
            Wheel::spawn(physics, at, config.heading, wheel)
        });

        let joints: Vec<JointHandle> = config
            .anchors
            .iter()
            .zip(&wheels)
            .map(|(anchor, wheel)| {
                physics.create_joint(
                    chassis,
                    wheel.body(),
                    &RevoluteDesc::new(Vec2::from(*anchor), Vec2::ZERO).with_limits(0.0, 0.0),
                )
            })
            .collect();

        let axle = SteeredAxle::new(joints[FRONT_LEFT], joints[FRONT_RIGHT], steering);

        log::debug!("vehicle spawned at ({:.1}, {:.1})", start.x, start.y);

        Self {
            chassis,
            wheels,
            axle,
            disposed: false,
        }
    }

    /// Friction and drive on every wheel, then one steering step on the front axle.
    pub fn update(&mut self, physics: &mut PhysicsWorld, input: InputSnapshot) {
        for wheel in &self.wheels {
            wheel.update(physics, input);
        }
        self.axle.steer(physics, SteerDirection::from_input(input));
    }

    /// Publish chassis and wheel poses.
    pub fn render(&mut self, physics: &PhysicsWorld, poses: &mut PoseBuffer) {
        let pos = physics.position(self.chassis);
        poses.push(
            RenderPose::new(pos.x, pos.y, physics.angle(self.chassis))
                .with_kind(MeshKind::Chassis.id()),
        );
        for wheel in &mut self.wheels {
            poses.push(wheel.render(physics));
        }
    }

    pub fn chassis(&self) -> BodyHandle {
        self.chassis
    }

    pub fn wheels(&self) -> &[Wheel; 4] {
        &self.wheels
    }

    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        physics.position(self.chassis)
    }

    /// Progress along the corridor axis.
    pub fn forward_position(&self, physics: &PhysicsWorld) -> f32 {
        self.position(physics).y
    }

    /// Signed chassis speed along its own heading.
    pub fn forward_speed(&self, physics: &PhysicsWorld) -> f32 {
        physics
            .world_vector(self.chassis, Vec2::Y)
            .dot(physics.linear_velocity(self.chassis))
    }

    /// Commanded front-wheel angle in radians. Positive turns left.
    pub fn steer_angle(&self) -> f32 {
        self.axle.angle()
    }

    pub fn axle(&self) -> &SteeredAxle {
        &self.axle
    }

    /// Remove the chassis and wheels from the simulation. Safe to call twice.
    pub fn dispose(&mut self, physics: &mut PhysicsWorld) {
        if self.disposed {
            return;
        }
        for wheel in &self.wheels {
            wheel.dispose(physics);
        }
        physics.remove_body(self.chassis);
        self.disposed = true;
    }
}
