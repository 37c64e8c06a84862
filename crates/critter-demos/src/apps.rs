use critter_engine::core::{App, AppControl, FrameCtx};
use critter_engine::paint::{pulse, Color};
use critter_engine::render::{MeshRenderer, ProgramSource, RenderCtx};
use critter_engine::SetupError;

use crate::shapes;

/// Empty window with a constant backdrop.
pub struct HelloWindow;

impl App for HelloWindow {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        ctx.render(Color::SLATE, |_, _| {})
    }
}

/// How the critter's colors change over time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ColorMode {
    /// Slate backdrop, orange critter.
    Static,
    /// Backdrop and critter tint both follow `pulse::green`.
    Pulse,
}

/// Head, body and legs drawn with the built-in program.
pub struct Critter {
    mode: ColorMode,
    renderer: Option<MeshRenderer>,
}

impl Critter {
    pub fn new(mode: ColorMode) -> Self {
        Self {
            mode,
            renderer: None,
        }
    }

    /// Clear color and tint at `t` seconds.
    pub fn colors_at(&self, t: f32) -> (Color, Color) {
        match self.mode {
            ColorMode::Static => (Color::SLATE, Color::ORANGE),
            ColorMode::Pulse => (pulse::clear_color(t), pulse::tint(t)),
        }
    }
}

impl App for Critter {
    fn on_init(&mut self, ctx: &RenderCtx<'_>) -> Result<(), SetupError> {
        let renderer = MeshRenderer::new(ctx, &ProgramSource::builtin(), &shapes::CRITTER)?;
        log::info!(
            "critter ready: {} meshes, {:?} mode",
            renderer.meshes().len(),
            self.mode
        );
        self.renderer = Some(renderer);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let (clear, tint) = self.colors_at(ctx.time.elapsed);
        let mode = self.mode;
        let Some(renderer) = self.renderer.as_ref() else {
            return ctx.render(clear, |_, _| {});
        };

        ctx.render(clear, |rctx, target| {
            if mode == ColorMode::Pulse {
                renderer.set_tint(rctx, tint);
            }
            renderer.render(rctx, target);
        })
    }
}
