use chase_engine::{
    Game, GameConfig, EngineContext, RenderContext,
    InputEvent, InputQueue, InputState, KeyBindings, PoseBuffer,
    FrameClock,
};

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export generic
/// structs directly.
///
/// Per frame: record frame time, fold queued input into a snapshot,
/// `Game::update`, exactly one physics step, then `Game::render` into a fresh
/// pose buffer.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    input_state: InputState,
    poses: PoseBuffer,
    clock: FrameClock,
    config: GameConfig,
    initialized: bool,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();

        Self {
            game,
            ctx: EngineContext::from_config(&config),
            input: InputQueue::new(),
            input_state: InputState::new(KeyBindings::default()),
            poses: PoseBuffer::new(config.max_poses),
            clock: FrameClock::new(config.fixed_dt),
            config,
            initialized: false,
        }
    }

    /// Forward tuning JSON to the game. Only honoured before `init`.
    pub fn configure(&mut self, json: &str) {
        if self.initialized {
            log::warn!("configure ignored: game already initialized");
            return;
        }
        if let Err(err) = self.game.configure(json) {
            log::warn!("configure rejected: {}", err);
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.config = self.game.config();
        self.ctx = EngineContext::from_config(&self.config);
        self.poses = PoseBuffer::new(self.config.max_poses);
        self.clock = FrameClock::new(self.config.fixed_dt);
        self.game.init(&mut self.ctx);
        self.initialized = true;
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Run one frame tick.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        self.clock.advance(dt);

        for event in self.input.drain() {
            self.input_state.apply(event);
        }
        let snapshot = self.input_state.snapshot();

        self.game.update(&mut self.ctx, snapshot);
        self.ctx.step_physics();

        self.poses.clear();
        let mut render_ctx = RenderContext {
            physics: &self.ctx.physics,
            poses: &mut self.poses,
        };
        self.game.render(&mut render_ctx);
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn poses(&self) -> &PoseBuffer {
        &self.poses
    }

    // ---- Pointer accessors for host reads ----

    pub fn poses_ptr(&self) -> *const f32 {
        self.poses.poses_ptr()
    }

    pub fn pose_count(&self) -> u32 {
        self.poses.pose_count()
    }

    pub fn max_poses(&self) -> u32 {
        self.config.max_poses as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chase_engine::{Control, InputSnapshot, RenderPose};

    #[derive(Default)]
    struct Probe {
        inits: u32,
        updates: Vec<InputSnapshot>,
        configured: Option<String>,
        physics_tick_at_update: Vec<u64>,
    }

    impl Game for Probe {
        fn configure(&mut self, json: &str) -> Result<(), serde_json::Error> {
            let _: serde_json::Value = serde_json::from_str(json)?;
            self.configured = Some(json.to_string());
            Ok(())
        }

        fn init(&mut self, _ctx: &mut EngineContext) {
            self.inits += 1;
        }

        fn update(&mut self, ctx: &mut EngineContext, input: InputSnapshot) {
            self.updates.push(input);
            self.physics_tick_at_update.push(ctx.tick());
        }

        fn render(&mut self, ctx: &mut RenderContext) {
            ctx.poses.push(RenderPose::new(1.0, 2.0, 0.0));
        }
    }

    #[test]
    fn tick_before_init_is_ignored() {
        let mut runner = GameRunner::new(Probe::default());
        runner.tick(1.0 / 60.0);
        assert!(runner.game().updates.is_empty());
        assert_eq!(runner.pose_count(), 0);
    }

    #[test]
    fn one_update_and_one_step_per_frame() {
        let mut runner = GameRunner::new(Probe::default());
        runner.init();
        runner.tick(0.5);
        runner.tick(0.001);

        assert_eq!(runner.game().inits, 1);
        assert_eq!(runner.game().physics_tick_at_update, vec![0, 1]);
        assert_eq!(runner.context().tick(), 2);
        assert_eq!(runner.clock().ticks(), 2);
    }

    #[test]
    fn key_events_become_snapshots() {
        let mut runner = GameRunner::new(Probe::default());
        runner.init();
        runner.push_input(InputEvent::KeyDown { key_code: KeyBindings::KEY_W });
        runner.tick(1.0 / 60.0);
        runner.tick(1.0 / 60.0);
        runner.push_input(InputEvent::KeyUp { key_code: KeyBindings::KEY_W });
        runner.tick(1.0 / 60.0);

        let updates = &runner.game().updates;
        assert!(updates[0].pressed(Control::Forward));
        assert!(updates[1].pressed(Control::Forward), "held keys persist between frames");
        assert!(updates[2].is_idle());
    }

    #[test]
    fn pose_buffer_is_rebuilt_each_frame() {
        let mut runner = GameRunner::new(Probe::default());
        runner.init();
        runner.tick(1.0 / 60.0);
        runner.tick(1.0 / 60.0);
        assert_eq!(runner.pose_count(), 1);
        assert_eq!(runner.poses().poses()[0], RenderPose::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn configure_only_before_init() {
        let mut runner = GameRunner::new(Probe::default());
        runner.configure("not json");
        assert!(runner.game().configured.is_none());

        runner.configure("{\"a\":1}");
        assert_eq!(runner.game().configured.as_deref(), Some("{\"a\":1}"));

        runner.init();
        runner.configure("{\"b\":2}");
        assert_eq!(runner.game().configured.as_deref(), Some("{\"a\":1}"));
    }
}
