pub mod controls;
pub mod queue;

pub use controls::{Control, InputSnapshot, InputState, KeyBindings};
pub use queue::{InputEvent, InputQueue};
