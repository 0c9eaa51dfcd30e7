use super::queue::InputEvent;

/// A logical driving control, independent of the physical key that triggers it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Forward,
    Backward,
    Left,
    Right,
}

impl Control {
    pub const ALL: [Control; 4] = [
        Control::Forward,
        Control::Backward,
        Control::Left,
        Control::Right,
    ];

    fn bit(self) -> u8 {
        match self {
            Control::Forward => 1,
            Control::Backward => 1 << 1,
            Control::Left => 1 << 2,
            Control::Right => 1 << 3,
        }
    }
}

/// The set of controls held during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    bits: u8,
}

impl InputSnapshot {
    /// Nothing pressed.
    pub const IDLE: InputSnapshot = InputSnapshot { bits: 0 };

    pub fn from_controls(controls: &[Control]) -> Self {
        controls
            .iter()
            .fold(Self::IDLE, |snapshot, &control| snapshot.with(control))
    }

    pub fn with(mut self, control: Control) -> Self {
        self.bits |= control.bit();
        self
    }

    pub fn without(mut self, control: Control) -> Self {
        self.bits &= !control.bit();
        self
    }

    pub fn pressed(&self, control: Control) -> bool {
        self.bits & control.bit() != 0
    }

    pub fn is_idle(&self) -> bool {
        self.bits == 0
    }
}

/// Maps host key codes to controls.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: Vec<(u32, Control)>,
}

impl KeyBindings {
    pub const KEY_W: u32 = 87;
    pub const KEY_S: u32 = 83;
    pub const KEY_A: u32 = 65;
    pub const KEY_D: u32 = 68;
    pub const ARROW_UP: u32 = 38;
    pub const ARROW_DOWN: u32 = 40;
    pub const ARROW_LEFT: u32 = 37;
    pub const ARROW_RIGHT: u32 = 39;

    /// No keys bound.
    pub fn empty() -> Self {
        Self { bindings: Vec::new() }
    }

    /// Bind `key_code` to `control`, replacing any earlier binding of that key.
    pub fn with_binding(mut self, key_code: u32, control: Control) -> Self {
        self.bindings.retain(|(key, _)| *key != key_code);
        self.bindings.push((key_code, control));
        self
    }

    pub fn control_for(&self, key_code: u32) -> Option<Control> {
        self.bindings
            .iter()
            .find(|(key, _)| *key == key_code)
            .map(|(_, control)| *control)
    }
}

impl Default for KeyBindings {
    /// WASD plus arrow keys.
    fn default() -> Self {
        Self::empty()
            .with_binding(Self::KEY_W, Control::Forward)
            .with_binding(Self::KEY_S, Control::Backward)
            .with_binding(Self::KEY_A, Control::Left)
            .with_binding(Self::KEY_D, Control::Right)
            .with_binding(Self::ARROW_UP, Control::Forward)
            .with_binding(Self::ARROW_DOWN, Control::Backward)
            .with_binding(Self::ARROW_LEFT, Control::Left)
            .with_binding(Self::ARROW_RIGHT, Control::Right)
    }
}

/// Held-key state folded from the event stream.
///
/// Each key is tracked individually, so releasing `A` while the left arrow is
/// still held keeps `Left` pressed.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    bindings: KeyBindings,
    held: Vec<u32>,
}

impl InputState {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held: Vec::new(),
        }
    }

    /// Fold one host event into the held-key set. Unbound keys are ignored.
    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key_code } => {
                if self.bindings.control_for(key_code).is_some() && !self.held.contains(&key_code) {
                    self.held.push(key_code);
                }
            }
            InputEvent::KeyUp { key_code } => {
                self.held.retain(|key| *key != key_code);
            }
        }
    }

    /// Controls pressed right now.
    pub fn snapshot(&self) -> InputSnapshot {
        self.held
            .iter()
            .filter_map(|key| self.bindings.control_for(*key))
            .fold(InputSnapshot::IDLE, |snapshot, control| snapshot.with(control))
    }

    /// Release everything, e.g. when the host window loses focus.
    pub fn release_all(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_bits_are_independent() {
        let snap = InputSnapshot::from_controls(&[Control::Forward, Control::Right]);
        assert!(snap.pressed(Control::Forward));
        assert!(snap.pressed(Control::Right));
        assert!(!snap.pressed(Control::Left));
        assert!(!snap.pressed(Control::Backward));
        assert!(!snap.without(Control::Forward).pressed(Control::Forward));
        assert!(InputSnapshot::IDLE.is_idle());
    }

    #[test]
    fn default_bindings_cover_wasd_and_arrows() {
        let keys = KeyBindings::default();
        assert_eq!(keys.control_for(KeyBindings::KEY_W), Some(Control::Forward));
        assert_eq!(keys.control_for(KeyBindings::ARROW_LEFT), Some(Control::Left));
        assert_eq!(keys.control_for(KeyBindings::KEY_D), Some(Control::Right));
        assert_eq!(keys.control_for(32), None);
    }

    #[test]
    fn rebinding_replaces_previous_control() {
        let keys = KeyBindings::default().with_binding(KeyBindings::KEY_W, Control::Backward);
        assert_eq!(keys.control_for(KeyBindings::KEY_W), Some(Control::Backward));
    }

    #[test]
    fn state_tracks_each_key() {
        let mut state = InputState::default();
        state.apply(InputEvent::KeyDown { key_code: KeyBindings::KEY_A });
        state.apply(InputEvent::KeyDown { key_code: KeyBindings::ARROW_LEFT });
        state.apply(InputEvent::KeyUp { key_code: KeyBindings::KEY_A });
        assert!(state.snapshot().pressed(Control::Left));

        state.apply(InputEvent::KeyUp { key_code: KeyBindings::ARROW_LEFT });
        assert!(state.snapshot().is_idle());
    }

    #[test]
    fn repeated_key_down_is_held_once() {
        let mut state = InputState::default();
        state.apply(InputEvent::KeyDown { key_code: KeyBindings::KEY_W });
        state.apply(InputEvent::KeyDown { key_code: KeyBindings::KEY_W });
        state.apply(InputEvent::KeyUp { key_code: KeyBindings::KEY_W });
        assert!(state.snapshot().is_idle());
    }

    #[test]
    fn release_all_clears_snapshot() {
        let mut state = InputState::default();
        state.apply(InputEvent::KeyDown { key_code: KeyBindings::KEY_S });
        state.release_all();
        assert!(state.snapshot().is_idle());
    }
}
