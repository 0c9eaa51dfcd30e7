use glam::Vec2;

use crate::core::physics::PhysicsWorld;
use crate::core::rng::Rng;
use crate::input::controls::InputSnapshot;
use crate::renderer::pose::PoseBuffer;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Fixed timestep in seconds (default: 1/60).
    pub fixed_dt: f32,
    /// Gravity vector for physics simulation. Default: zero (top-down).
    pub gravity: Vec2,
    /// Seed for the shared random source.
    pub seed: u64,
    /// Maximum number of render poses per frame (default: 64).
    pub max_poses: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            gravity: Vec2::ZERO,
            seed: 42,
            max_poses: 64,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Apply host-supplied tuning JSON. Called before `config` and `init`.
    fn configure(&mut self, _json: &str) -> Result<(), serde_json::Error> {
        Ok(())
    }

    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Build the initial world.
    fn init(&mut self, ctx: &mut EngineContext);

    /// One simulation tick, run before the physics step.
    fn update(&mut self, ctx: &mut EngineContext, input: InputSnapshot);

    /// Publish poses after the physics step.
    fn render(&mut self, _ctx: &mut RenderContext) {}
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub physics: PhysicsWorld,
    pub rng: Rng,
    tick: u64,
}

impl EngineContext {
    pub fn new() -> Self {
        Self::from_config(&GameConfig::default())
    }

    /// Create an EngineContext matching a game's configuration.
    pub fn from_config(config: &GameConfig) -> Self {
        let mut physics = PhysicsWorld::new(config.gravity);
        physics.set_dt(config.fixed_dt);
        Self {
            physics,
            rng: Rng::new(config.seed),
            tick: 0,
        }
    }

    /// Number of physics steps taken so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance the physics simulation by exactly one fixed step.
    /// Called automatically by the game runner after `Game::update()`.
    pub fn step_physics(&mut self) {
        self.physics.step();
        self.tick += 1;
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only physics view plus the pose buffer being filled this frame.
pub struct RenderContext<'a> {
    pub physics: &'a PhysicsWorld,
    pub poses: &'a mut PoseBuffer,
}
