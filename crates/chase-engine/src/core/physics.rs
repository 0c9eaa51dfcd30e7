use glam::Vec2;
use rapier2d::prelude::*;

// ---------------------------------------------------------------------------
// Conversion helpers (private): glam ↔ nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(v.x, v.y)
}

fn na_to_vec2(v: &nalgebra::Vector2<f32>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

fn vec2_to_point(v: Vec2) -> nalgebra::Point2<f32> {
    nalgebra::Point2::new(v.x, v.y)
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// The kind of rigid body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic,
    Fixed,
}

impl BodyType {
    fn to_rapier(self) -> RigidBodyType {
        match self {
            BodyType::Dynamic => RigidBodyType::Dynamic,
            BodyType::Fixed => RigidBodyType::Fixed,
        }
    }
}

/// Shape description for a collider, in the owning body's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderDesc {
    Ball { radius: f32 },
    Cuboid { half_width: f32, half_height: f32 },
    /// A two-sided line segment. Used for static boundary edges.
    Segment { a: Vec2, b: Vec2 },
}

impl ColliderDesc {
    fn build_collider(&self) -> ColliderBuilder {
        match *self {
            ColliderDesc::Ball { radius } => ColliderBuilder::ball(radius),
            ColliderDesc::Cuboid { half_width, half_height } => {
                ColliderBuilder::cuboid(half_width, half_height)
            }
            ColliderDesc::Segment { a, b } => {
                ColliderBuilder::segment(vec2_to_point(a), vec2_to_point(b))
            }
        }
    }
}

/// Category/mask bit pair deciding which colliders may touch.
///
/// Two colliders interact when each one's category intersects the other's mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
}

impl CollisionFilter {
    pub const fn new(category: u32, mask: u32) -> Self {
        Self { category, mask }
    }

    /// Whether colliders carrying `self` and `other` are allowed to collide.
    pub fn allows(&self, other: &CollisionFilter) -> bool {
        self.category & other.mask != 0 && other.category & self.mask != 0
    }

    fn to_rapier(self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.category),
            Group::from_bits_truncate(self.mask),
        )
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::new(1, u32::MAX)
    }
}

/// Physical material properties for a collider.
#[derive(Debug, Clone, Copy)]
pub struct ColliderMaterial {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl ColliderMaterial {
    pub fn with_density(density: f32) -> Self {
        Self {
            density,
            ..Self::default()
        }
    }
}

impl Default for ColliderMaterial {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            friction: 0.2,
            density: 1.0,
        }
    }
}

/// Builder for describing a rigid body before creation.
/// Colliders are attached afterwards with [`PhysicsWorld::add_collider`].
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub body_type: BodyType,
    pub position: Vec2,
    pub rotation: f32,
    pub velocity: Vec2,
}

impl BodyDesc {
    /// Create a dynamic body description.
    pub fn dynamic() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
        }
    }

    /// Create a fixed (static) body description.
    pub fn fixed() -> Self {
        Self {
            body_type: BodyType::Fixed,
            ..Self::dynamic()
        }
    }

    pub fn with_position(mut self, pos: Vec2) -> Self {
        self.position = pos;
        self
    }

    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.velocity = vel;
        self
    }
}

/// Opaque reference to a rigid body owned by one game entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Handle to a joint in the physics simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointHandle {
    raw: ImpulseJointHandle,
    body_a: BodyHandle,
    body_b: BodyHandle,
}

impl JointHandle {
    pub fn body_a(&self) -> BodyHandle {
        self.body_a
    }

    pub fn body_b(&self) -> BodyHandle {
        self.body_b
    }
}

/// Description of a revolute (hinge) joint between two bodies.
#[derive(Debug, Clone, Copy)]
pub struct RevoluteDesc {
    /// Anchor in body A's local frame.
    pub anchor_a: Vec2,
    /// Anchor in body B's local frame.
    pub anchor_b: Vec2,
    /// Lower/upper relative angle window. `None` rotates freely.
    pub limits: Option<[f32; 2]>,
    /// Whether the two joined bodies still collide with each other.
    pub collide_connected: bool,
}

impl RevoluteDesc {
    pub fn new(anchor_a: Vec2, anchor_b: Vec2) -> Self {
        Self {
            anchor_a,
            anchor_b,
            limits: None,
            collide_connected: false,
        }
    }

    pub fn with_limits(mut self, lower: f32, upper: f32) -> Self {
        self.limits = Some([lower, upper]);
        self
    }
}

// ---------------------------------------------------------------------------
// PhysicsWorld
// ---------------------------------------------------------------------------

/// Wraps all Rapier2D boilerplate into a single struct.
///
/// Forces follow Box2D semantics: anything added with [`apply_force`] acts for
/// exactly one [`step`] and is cleared afterwards.
///
/// Every per-body accessor panics when handed a handle whose body was already
/// removed. Entities own their handles exclusively, so a stale handle means an
/// entity kept running after disposal.
///
/// [`apply_force`]: PhysicsWorld::apply_force
/// [`step`]: PhysicsWorld::step
pub struct PhysicsWorld {
    gravity: nalgebra::Vector2<f32>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl PhysicsWorld {
    /// Create a new physics world with the given gravity vector.
    /// Top-down games use `Vec2::ZERO`.
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity: vec2_to_na(gravity),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Set the integration timestep.
    pub fn set_dt(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
    }

    pub fn dt(&self) -> f32 {
        self.integration_parameters.dt
    }

    /// Create a rigid body without colliders.
    pub fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let rb = RigidBodyBuilder::new(desc.body_type.to_rapier())
            .translation(vec2_to_na(desc.position))
            .rotation(desc.rotation)
            .linvel(vec2_to_na(desc.velocity))
            .build();

        BodyHandle(self.bodies.insert(rb))
    }

    /// Attach a collider (fixture) to an existing body.
    pub fn add_collider(
        &mut self,
        body: BodyHandle,
        shape: &ColliderDesc,
        filter: CollisionFilter,
        material: ColliderMaterial,
    ) {
        self.body(body);
        let collider = shape
            .build_collider()
            .restitution(material.restitution)
            .friction(material.friction)
            .density(material.density)
            .collision_groups(filter.to_rapier())
            .build();

        self.colliders
            .insert_with_parent(collider, body.0, &mut self.bodies);

        // Mass is otherwise only refreshed inside the next step.
        if let Some(rb) = self.bodies.get_mut(body.0) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }
    }

    /// Remove a body together with its colliders and joints.
    /// Returns `false` when the body was already gone.
    pub fn remove_body(&mut self, body: BodyHandle) -> bool {
        self.bodies
            .remove(
                body.0,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    /// Whether the body behind `body` is still part of the simulation.
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.bodies.contains(body.0)
    }

    /// Advance the simulation by one fixed timestep, then clear accumulated forces.
    pub fn step(&mut self) {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        for (_, rb) in self.bodies.iter_mut() {
            rb.reset_forces(false);
            rb.reset_torques(false);
        }
    }

    // -- Force application --

    /// Apply a force at the centre of mass for the next step.
    pub fn apply_force(&mut self, body: BodyHandle, force: Vec2) {
        self.body_mut(body).add_force(vec2_to_na(force), true);
    }

    /// Apply an instantaneous linear impulse at the centre of mass.
    pub fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec2) {
        self.body_mut(body).apply_impulse(vec2_to_na(impulse), true);
    }

    /// Apply an instantaneous angular impulse.
    pub fn apply_angular_impulse(&mut self, body: BodyHandle, impulse: f32) {
        self.body_mut(body).apply_torque_impulse(impulse, true);
    }

    // -- Queries --

    pub fn position(&self, body: BodyHandle) -> Vec2 {
        na_to_vec2(self.body(body).translation())
    }

    /// Orientation in radians.
    pub fn angle(&self, body: BodyHandle) -> f32 {
        self.body(body).rotation().angle()
    }

    pub fn linear_velocity(&self, body: BodyHandle) -> Vec2 {
        na_to_vec2(self.body(body).linvel())
    }

    pub fn angular_velocity(&self, body: BodyHandle) -> f32 {
        self.body(body).angvel()
    }

    pub fn mass(&self, body: BodyHandle) -> f32 {
        self.body(body).mass()
    }

    /// Rotational inertia about the centre of mass.
    pub fn inertia(&self, body: BodyHandle) -> f32 {
        self.body(body)
            .mass_properties()
            .local_mprops
            .principal_inertia()
    }

    /// Rotate a body-local direction into world space using the current orientation.
    pub fn world_vector(&self, body: BodyHandle, local: Vec2) -> Vec2 {
        na_to_vec2(&(self.body(body).rotation() * vec2_to_na(local)))
    }

    /// Transform a body-local point into world space.
    pub fn world_point(&self, body: BodyHandle, local: Vec2) -> Vec2 {
        let world = self.body(body).position() * vec2_to_point(local);
        Vec2::new(world.x, world.y)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    // -- Joint methods --

    /// Create a revolute joint between two bodies.
    pub fn create_joint(
        &mut self,
        body_a: BodyHandle,
        body_b: BodyHandle,
        desc: &RevoluteDesc,
    ) -> JointHandle {
        self.body(body_a);
        self.body(body_b);

        let mut builder = RevoluteJointBuilder::new()
            .local_anchor1(vec2_to_point(desc.anchor_a))
            .local_anchor2(vec2_to_point(desc.anchor_b))
            .contacts_enabled(desc.collide_connected);
        if let Some(limits) = desc.limits {
            builder = builder.limits(limits);
        }

        let raw = self
            .impulse_joints
            .insert(body_a.0, body_b.0, builder.build(), true);
        JointHandle { raw, body_a, body_b }
    }

    /// Relative angle of body B with respect to body A, in `(-π, π]`.
    pub fn joint_angle(&self, joint: &JointHandle) -> f32 {
        let a = self.body(joint.body_a).rotation();
        let b = self.body(joint.body_b).rotation();
        (a.inverse() * b).angle()
    }

    /// Replace the angular limit window of a revolute joint.
    pub fn set_joint_limits(&mut self, joint: &JointHandle, lower: f32, upper: f32) {
        let Some(data) = self.impulse_joints.get_mut(joint.raw) else {
            panic!("joint {:?} used after its bodies were removed", joint.raw);
        };
        data.data.set_limits(JointAxis::AngX, [lower, upper]);

        self.body_mut(joint.body_a).wake_up(true);
        self.body_mut(joint.body_b).wake_up(true);
    }

    /// Current angular limit window, if the joint has one.
    pub fn joint_limits(&self, joint: &JointHandle) -> Option<[f32; 2]> {
        let data = self.impulse_joints.get(joint.raw)?;
        data.data
            .limits(JointAxis::AngX)
            .map(|limits| [limits.min, limits.max])
    }

    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    // -- private helpers --

    fn body(&self, body: BodyHandle) -> &RigidBody {
        match self.bodies.get(body.0) {
            Some(rb) => rb,
            None => panic!("physics body {:?} accessed after removal", body.0),
        }
    }

    fn body_mut(&mut self, body: BodyHandle) -> &mut RigidBody {
        match self.bodies.get_mut(body.0) {
            Some(rb) => rb,
            None => panic!("physics body {:?} accessed after removal", body.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
