pub mod runner;

pub use runner::GameRunner;

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Generates `thread_local!` storage for the GameRunner, a `with_runner()`
/// helper and the wasm-bindgen exports (configure, init, tick, key input,
/// pose accessors).
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use chase_engine::*;
///
/// mod game;
/// use game::MyGame;
///
/// chase_web::export_game!(MyGame, "my-game");
/// ```
///
/// # Arguments
///
/// - `$game_type`: The game struct type that implements `chase_engine::Game`
///   and provides `new()`
/// - `$game_name`: A string literal used in the initialization log message
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> R {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                let runner = borrow.get_or_insert_with(|| $crate::GameRunner::new(<$game_type>::new()));
                f(runner)
            })
        }

        fn install_logging() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);
        }

        /// Apply tuning JSON. Must be called before `game_init` to take effect.
        #[wasm_bindgen]
        pub fn game_configure(json: &str) {
            install_logging();
            with_runner(|r| r.configure(json));
        }

        #[wasm_bindgen]
        pub fn game_init() {
            install_logging();
            with_runner(|r| r.init());
            log::info!("{}: initialized", $game_name);
        }

        #[wasm_bindgen]
        pub fn game_tick(dt: f32) {
            with_runner(|r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn game_key_down(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyDown { key_code }));
        }

        #[wasm_bindgen]
        pub fn game_key_up(key_code: u32) {
            with_runner(|r| r.push_input(InputEvent::KeyUp { key_code }));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_poses_ptr() -> *const f32 {
            with_runner(|r| r.poses_ptr())
        }

        #[wasm_bindgen]
        pub fn get_pose_count() -> u32 {
            with_runner(|r| r.pose_count())
        }

        #[wasm_bindgen]
        pub fn get_pose_floats() -> u32 {
            RenderPose::FLOATS as u32
        }

        #[wasm_bindgen]
        pub fn get_max_poses() -> u32 {
            with_runner(|r| r.max_poses())
        }
    };
}
