use chase_engine::{
    BodyDesc, BodyHandle, ColliderDesc, ColliderMaterial, PhysicsWorld, PoseBuffer, RandomSource,
    RenderPose,
};
use glam::Vec2;
use serde::Deserialize;

use crate::layers::{MeshKind, PURSUER_FILTER, SEPARATION_FILTER};

/// Pursuer spawning and steering parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PursuerConfig {
    /// Pursuers kept alive around the vehicle.
    pub count: usize,
    /// Pursuers farther than this from the vehicle are respawned. `0` disables.
    pub leash_distance: f32,
    /// Half-extent of the square spawn area centred on the vehicle.
    pub spawn_radius: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_impulse: f32,
    pub max_impulse: f32,
    /// Probability a fresh pursuer starts out seeking.
    pub seek_probability: f32,
    /// Per-tick probability of flipping between seeking and idling.
    pub toggle_probability: f32,
    /// No attraction inside this distance.
    pub engagement_range: f32,
    /// Fraction of velocity removed each tick.
    pub damping: f32,
    pub body_radius: f32,
    pub body_density: f32,
    pub min_separation: f32,
    pub max_separation: f32,
}

impl Default for PursuerConfig {
    fn default() -> Self {
        Self {
            count: 6,
            leash_distance: 400.0,
            spawn_radius: 80.0,
            min_speed: 35.0,
            max_speed: 42.0,
            min_impulse: 0.5,
            max_impulse: 1.0,
            seek_probability: 0.8,
            toggle_probability: 0.01,
            engagement_range: 20.0,
            damping: 0.01,
            body_radius: 1.0,
            body_density: 0.1,
            min_separation: 2.0,
            max_separation: 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuerState {
    Seeking,
    Idle,
}

impl PursuerState {
    fn toggled(self) -> Self {
        match self {
            PursuerState::Seeking => PursuerState::Idle,
            PursuerState::Idle => PursuerState::Seeking,
        }
    }
}

/// An autonomous chaser that alternates between homing in on the vehicle and drifting.
pub struct Pursuer {
    body: BodyHandle,
    state: PursuerState,
    max_forward_speed: f32,
    max_impulse: f32,
    spawn_offset: Vec2,
    separation_radius: f32,
    config: PursuerConfig,
    disposed: bool,
}

impl Pursuer {
    /// Spawn at a random offset around `around`. Terrain is not consulted, so a
    /// pursuer may start inside a corridor wall.
    pub fn spawn(
        physics: &mut PhysicsWorld,
        around: Vec2,
        config: &PursuerConfig,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let max_forward_speed = rng.range(config.min_speed, config.max_speed);
        let max_impulse = rng.range(config.min_impulse, config.max_impulse);
        let state = if rng.chance(config.seek_probability) {
            PursuerState::Seeking
        } else {
            PursuerState::Idle
        };
        let r = config.spawn_radius;
        let spawn_offset = Vec2::new(rng.range(-r, r), rng.range(-r, r));
        let separation_radius = rng.range(config.min_separation, config.max_separation);

        let body = physics.create_body(&BodyDesc::dynamic().with_position(around + spawn_offset));
        physics.add_collider(
            body,
            &ColliderDesc::Ball { radius: config.body_radius },
            PURSUER_FILTER,
            ColliderMaterial::with_density(config.body_density),
        );
        physics.add_collider(
            body,
            &ColliderDesc::Ball { radius: separation_radius },
            SEPARATION_FILTER,
            ColliderMaterial::with_density(0.0),
        );

        Self {
            body,
            state,
            max_forward_speed,
            max_impulse,
            spawn_offset,
            separation_radius,
            config: config.clone(),
            disposed: false,
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn state(&self) -> PursuerState {
        self.state
    }

    pub fn max_forward_speed(&self) -> f32 {
        self.max_forward_speed
    }

    pub fn max_impulse(&self) -> f32 {
        self.max_impulse
    }

    pub fn spawn_offset(&self) -> Vec2 {
        self.spawn_offset
    }

    pub fn separation_radius(&self) -> f32 {
        self.separation_radius
    }

    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        physics.position(self.body)
    }

    /// One behaviour tick against the vehicle at `target`.
    /// Returns whether an attraction impulse was applied.
    pub fn update(
        &mut self,
        physics: &mut PhysicsWorld,
        target: Vec2,
        rng: &mut dyn RandomSource,
    ) -> bool {
        let mut attracted = false;

        if self.state == PursuerState::Seeking {
            let to_target = target - physics.position(self.body);
            let distance = to_target.length();
            let speed = physics.linear_velocity(self.body).length();

            if distance > self.config.engagement_range && speed < self.max_forward_speed {
                physics.apply_impulse(self.body, to_target.normalize_or_zero() * self.max_impulse);
                attracted = true;
            }
        }

        let damping = physics.linear_velocity(self.body) * -self.config.damping;
        physics.apply_impulse(self.body, damping);

        if rng.chance(self.config.toggle_probability) {
            self.state = self.state.toggled();
        }
        attracted
    }

    pub fn render(&self, physics: &PhysicsWorld) -> RenderPose {
        let pos = physics.position(self.body);
        RenderPose::new(pos.x, pos.y, physics.angle(self.body)).with_kind(MeshKind::Pursuer.id())
    }

    /// Remove the body. Safe to call twice.
    pub fn dispose(&mut self, physics: &mut PhysicsWorld) {
        if self.disposed {
            return;
        }
        physics.remove_body(self.body);
        self.disposed = true;
    }
}

/// Fixed-size group of pursuers kept near the vehicle.
pub struct PursuerPack {
    pursuers: Vec<Pursuer>,
    config: PursuerConfig,
    respawned: u64,
}

impl PursuerPack {
    pub fn spawn(
        physics: &mut PhysicsWorld,
        around: Vec2,
        config: &PursuerConfig,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let pursuers = (0..config.count)
            .map(|_| Pursuer::spawn(physics, around, config, rng))
            .collect();

        Self {
            pursuers,
            config: config.clone(),
            respawned: 0,
        }
    }

    /// Replace stragglers beyond the leash, then run every pursuer's behaviour.
    pub fn update(&mut self, physics: &mut PhysicsWorld, target: Vec2, rng: &mut dyn RandomSource) {
        let leash = self.config.leash_distance;
        if leash > 0.0 {
            for slot in &mut self.pursuers {
                if slot.position(physics).distance(target) > leash {
                    slot.dispose(physics);
                    *slot = Pursuer::spawn(physics, target, &self.config, rng);
                    self.respawned += 1;
                    log::debug!("pursuer left the leash, respawned near ({:.1}, {:.1})", target.x, target.y);
                }
            }
        }

        for pursuer in &mut self.pursuers {
            pursuer.update(physics, target, rng);
        }
    }

    pub fn render(&self, physics: &PhysicsWorld, poses: &mut PoseBuffer) {
        for pursuer in &self.pursuers {
            poses.push(pursuer.render(physics));
        }
    }

    pub fn clear(&mut self, physics: &mut PhysicsWorld) {
        for mut pursuer in self.pursuers.drain(..) {
            pursuer.dispose(physics);
        }
    }

    pub fn len(&self) -> usize {
        self.pursuers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pursuers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pursuer> {
        self.pursuers.iter()
    }

    /// Pursuers replaced for straying past the leash.
    pub fn respawned(&self) -> u64 {
        self.respawned
    }
}
