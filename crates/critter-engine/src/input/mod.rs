//! Input subsystem.
//!
//! The public API does not expose winit types; `platform::winit` translates
//! window-system events into `InputEvent`s for the runtime.

mod frame;
mod state;
mod types;

pub(crate) mod platform {
    pub(crate) mod winit;
}

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState};
