//! Colors and time-driven color animation.

mod color;
pub mod pulse;

pub use color::Color;
