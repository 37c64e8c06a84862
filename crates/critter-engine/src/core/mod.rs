//! Contracts between the runtime loop and application code.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
