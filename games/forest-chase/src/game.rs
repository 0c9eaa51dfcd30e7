use chase_engine::*;
use glam::Vec2;

use crate::config::Tuning;
use crate::pursuer::PursuerPack;
use crate::terrain::{TerrainError, TerrainStream};
use crate::vehicle::Vehicle;

/// Everything living in the physics world for one run.
pub struct Session {
    vehicle: Vehicle,
    terrain: TerrainStream,
    pursuers: PursuerPack,
}

impl Session {
    pub fn build(
        physics: &mut PhysicsWorld,
        tuning: &Tuning,
        rng: &mut dyn RandomSource,
    ) -> Result<Self, TerrainError> {
        let terrain = TerrainStream::new(
            physics,
            Vec2::ZERO,
            &tuning.chunk,
            &tuning.stream,
            rng,
        )?;
        let vehicle = Vehicle::spawn(physics, &tuning.vehicle, &tuning.wheel, &tuning.steering);
        let pursuers = PursuerPack::spawn(physics, vehicle.position(physics), &tuning.pursuers, rng);

        Ok(Self {
            vehicle,
            terrain,
            pursuers,
        })
    }

    /// Stream terrain, drive the vehicle, then steer the pursuers.
    pub fn update(
        &mut self,
        physics: &mut PhysicsWorld,
        input: InputSnapshot,
        rng: &mut dyn RandomSource,
    ) -> Result<(), TerrainError> {
        let forward = self.vehicle.forward_position(physics);
        self.terrain.update(physics, forward, rng)?;

        self.vehicle.update(physics, input);

        let target = self.vehicle.position(physics);
        self.pursuers.update(physics, target, rng);
        Ok(())
    }

    pub fn render(&mut self, physics: &PhysicsWorld, poses: &mut PoseBuffer) {
        self.terrain.render(poses);
        self.vehicle.render(physics, poses);
        self.pursuers.render(physics, poses);
    }

    pub fn dispose(&mut self, physics: &mut PhysicsWorld) {
        self.pursuers.clear(physics);
        self.vehicle.dispose(physics);
        self.terrain.clear(physics);
    }

    pub fn vehicle(&self) -> &Vehicle {
        &self.vehicle
    }

    pub fn terrain(&self) -> &TerrainStream {
        &self.terrain
    }

    pub fn pursuers(&self) -> &PursuerPack {
        &self.pursuers
    }
}

/// Drive down an endless forest corridor while pursuers close in.
pub struct ForestChase {
    tuning: Tuning,
    session: Option<Session>,
}

impl ForestChase {
    pub fn new() -> Self {
        Self::with_tuning(Tuning::default())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        Self {
            tuning,
            session: None,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }
}

impl Default for ForestChase {
    fn default() -> Self {
        Self::new()
    }
}

fn corridor_broken(err: TerrainError) -> ! {
    log::error!("forest corridor broken: {}", err);
    panic!("forest corridor broken: {}", err);
}

impl Game for ForestChase {
    fn configure(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let tuning = Tuning::from_json(json)?;
        match tuning.validate() {
            Ok(()) => {
                self.tuning = tuning;
                log::info!("ForestChase: tuning applied");
            }
            Err(err) => log::warn!("ForestChase: tuning rejected, keeping previous values: {}", err),
        }
        Ok(())
    }

    fn config(&self) -> GameConfig {
        let defaults = GameConfig::default();
        GameConfig {
            fixed_dt: self.tuning.fixed_dt(),
            seed: self.tuning.seed.unwrap_or(defaults.seed),
            max_poses: self.tuning.stream.window_chunks + 5 + self.tuning.pursuers.count,
            ..defaults
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        if let Some(mut previous) = self.session.take() {
            previous.dispose(&mut ctx.physics);
        }

        match Session::build(&mut ctx.physics, &self.tuning, &mut ctx.rng) {
            Ok(session) => {
                log::info!(
                    "ForestChase: {} chunks, {} pursuers",
                    session.terrain().len(),
                    session.pursuers().len()
                );
                self.session = Some(session);
            }
            Err(err) => corridor_broken(err),
        }
    }

    fn update(&mut self, ctx: &mut EngineContext, input: InputSnapshot) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Err(err) = session.update(&mut ctx.physics, input, &mut ctx.rng) {
            corridor_broken(err);
        }
    }

    fn render(&mut self, ctx: &mut RenderContext) {
        if let Some(session) = self.session.as_mut() {
            session.render(ctx.physics, ctx.poses);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::MeshKind;
    use crate::terrain::ChunkId;
    use chase_web::GameRunner;

    fn quiet_tuning() -> Tuning {
        let mut tuning = Tuning::default();
        tuning.pursuers.count = 0;
        tuning.chunk.jitter = 0.0;
        tuning.chunk.wave_amplitude = 0.0;
        tuning
    }

    #[test]
    fn init_builds_full_session() {
        let mut game = ForestChase::new();
        let mut ctx = EngineContext::from_config(&game.config());
        game.init(&mut ctx);

        let session = game.session().unwrap();
        assert_eq!(session.terrain().len(), 4);
        assert_eq!(session.pursuers().len(), 6);
        assert_eq!(ctx.physics.body_count(), 4 + 5 + 6);
    }

    #[test]
    fn reinit_replaces_previous_session() {
        let mut game = ForestChase::new();
        let mut ctx = EngineContext::new();
        game.init(&mut ctx);
        game.init(&mut ctx);
        assert_eq!(ctx.physics.body_count(), 4 + 5 + 6);
    }

    #[test]
    fn config_follows_tuning() {
        let mut game = ForestChase::new();
        game.configure(r#"{ "seed": 99, "steering": { "tick_rate": 30 } }"#).unwrap();
        let config = game.config();
        assert_eq!(config.seed, 99);
        assert!((config.fixed_dt - 1.0 / 30.0).abs() < 1e-7);
        assert_eq!(config.max_poses, 4 + 5 + 6);
    }

    #[test]
    fn invalid_tuning_is_ignored() {
        let mut game = ForestChase::new();
        assert!(game.configure(r#"{ "chunk": { "tile": -5 } }"#).is_ok());
        assert_eq!(game.tuning(), &Tuning::default());
        assert!(game.configure("{").is_err());
    }

    #[test]
    #[should_panic(expected = "forest corridor broken")]
    fn degenerate_corridor_aborts_init() {
        let mut tuning = Tuning::default();
        tuning.chunk.parts = 1;
        let mut game = ForestChase::with_tuning(tuning);
        let mut ctx = EngineContext::new();
        game.init(&mut ctx);
    }

    #[test]
    fn idle_minute_keeps_car_parked() {
        let mut runner = GameRunner::new(ForestChase::with_tuning(quiet_tuning()));
        runner.init();
        for _ in 0..60 {
            runner.tick(1.0 / 60.0);
        }

        let session = runner.game().session().unwrap();
        let physics = &runner.context().physics;
        assert_eq!(session.vehicle().steer_angle(), 0.0);
        assert!(session.vehicle().forward_speed(physics).abs() < 1e-4);
        assert_eq!(session.terrain().generated(), 4);
    }

    #[test]
    fn driving_forward_streams_terrain() {
        let mut tuning = quiet_tuning();
        tuning.stream.trigger_lead = 1.0;
        tuning.vehicle.start = [0.0, 172.0];
        let mut runner = GameRunner::new(ForestChase::with_tuning(tuning));
        runner.init();
        runner.push_input(InputEvent::KeyDown { key_code: KeyBindings::KEY_W });
        for _ in 0..240 {
            runner.tick(1.0 / 60.0);
        }

        let session = runner.game().session().unwrap();
        let physics = &runner.context().physics;
        let position = session.vehicle().forward_position(physics);
        assert!(position > 181.0, "position={}", position);
        assert!(session.terrain().generated() >= 5, "generated={}", session.terrain().generated());
        assert_eq!(session.terrain().len(), 4);
        assert!(!session.terrain().contains(ChunkId(0)));
        assert!(session.terrain().chunks().any(|c| c.span().0 <= position && position <= c.span().1));
    }

    #[test]
    fn poses_cover_every_entity() {
        let mut runner = GameRunner::new(ForestChase::new());
        runner.init();
        runner.tick(1.0 / 60.0);

        let poses = runner.poses().poses();
        assert_eq!(poses.len(), 4 + 5 + 6);
        let count = |kind: MeshKind| poses.iter().filter(|p| p.kind == kind.id() as f32).count();
        assert_eq!(count(MeshKind::Chunk), 4);
        assert_eq!(count(MeshKind::Chassis), 1);
        assert_eq!(count(MeshKind::Wheel), 4);
        assert_eq!(count(MeshKind::Pursuer), 6);
    }

    #[test]
    fn steering_keys_reach_lock() {
        let mut runner = GameRunner::new(ForestChase::with_tuning(quiet_tuning()));
        runner.init();
        runner.push_input(InputEvent::KeyDown { key_code: KeyBindings::KEY_A });
        for _ in 0..6 {
            runner.tick(1.0 / 60.0);
        }
        let angle = runner.game().session().unwrap().vehicle().steer_angle();
        assert_eq!(angle, 30f32.to_radians());
    }
}
