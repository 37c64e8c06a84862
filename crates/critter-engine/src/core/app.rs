use winit::event::WindowEvent;

use crate::error::SetupError;
use crate::render::RenderCtx;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by the runtime.
pub trait App {
    /// Called once, right after the window and GPU context exist.
    ///
    /// Create shader programs and upload static meshes here. An error aborts
    /// startup: the window is torn down and `Runtime::run` returns it.
    fn on_init(&mut self, ctx: &RenderCtx<'_>) -> Result<(), SetupError> {
        let _ = ctx;
        Ok(())
    }

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per render-loop iteration while the loop is running.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
