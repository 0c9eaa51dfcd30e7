pub mod api;
pub mod core;
pub mod renderer;
pub mod input;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext, RenderContext};
pub use core::time::FrameClock;
pub use core::rng::{Rng, RandomSource};
pub use renderer::pose::{RenderPose, PoseBuffer};
pub use input::{Control, InputEvent, InputQueue, InputSnapshot, InputState, KeyBindings};

pub use core::physics::{
    PhysicsWorld, BodyHandle, BodyDesc, BodyType,
    ColliderDesc, ColliderMaterial, CollisionFilter,
    JointHandle, RevoluteDesc,
};
