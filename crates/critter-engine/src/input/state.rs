use std::collections::HashSet;

use super::frame::InputFrame;
use super::types::{InputEvent, Key, KeyState};

/// Held keys for the window.
///
/// A press is recorded into the `InputFrame` only on the up→down transition,
/// so OS key-repeat never counts twice.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<Key>,
}

impl InputState {
    /// Applies an input event to the held set and records new presses in `frame`.
    pub fn apply_event(&mut self, frame: &mut InputFrame, ev: InputEvent) {
        match ev {
            // Releases are not delivered while unfocused.
            InputEvent::Focused(false) => self.keys_down.clear(),
            InputEvent::Focused(true) => {}

            InputEvent::Key { key, state } => match state {
                KeyState::Pressed => {
                    if self.keys_down.insert(key) {
                        frame.record_press(key);
                    }
                }
                KeyState::Released => {
                    self.keys_down.remove(&key);
                }
            },
        }
    }
}
