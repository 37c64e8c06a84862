//! Window + runtime loop.
//!
//! Owns the `winit` event loop and the single window, wires them to the GPU
//! layer, and drives the `Running`/`Closed` render loop.

mod lifecycle;
mod runtime;

pub use lifecycle::{CloseReason, FrameLoop, Iteration, LoopPhase};
pub use runtime::{Runtime, RuntimeConfig};
