use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::error::SetupError;
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputFrame, InputState, Key};
use crate::render::RenderCtx;
use crate::time::FrameClock;

use super::lifecycle::{CloseReason, FrameLoop, Iteration};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,

    /// Key that closes the window when pressed. `None` leaves closing to the
    /// window system.
    pub cancel_key: Option<Key>,
}

impl RuntimeConfig {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            initial_size: LogicalSize::new(width as f64, height as f64),
            ..Self::default()
        }
    }

    pub fn with_cancel_key(mut self, key: Option<Key>) -> Self {
        self.cancel_key = key;
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "LearnOpenGL".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            cancel_key: Some(Key::Escape),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, runs setup, and drives the render loop until close.
    ///
    /// Returns `Ok(())` on a normal close. Setup failures come back as a
    /// [`SetupError`] inside the `anyhow::Error`, after every partially
    /// acquired resource has been dropped.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new()
            .map_err(|e| SetupError::window(format!("failed to create event loop: {e}")))?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("event loop terminated with error")?;

        if let Some(err) = state.failure.take() {
            return Err(err.into());
        }

        log::info!(
            "render loop closed after {} iterations, {} frames presented ({:?})",
            state.frame_loop.iterations(),
            state.frame_loop.frames_presented(),
            state.frame_loop.close_reason()
        );
        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: App + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    frame_loop: FrameLoop,
    failure: Option<SetupError>,
}

impl<A> AppState<A>
where
    A: App + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            frame_loop: FrameLoop::new(),
            failure: None,
        }
    }

    /// Window, then GPU context. The window is dropped if the context fails.
    fn create_window_entry(
        &self,
        event_loop: &ActiveEventLoop,
    ) -> Result<WindowEntry, SetupError> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .map_err(|e| SetupError::window(e.to_string()))?;

        let size = window.inner_size();
        log::info!(
            "window `{}` created at {}x{}",
            self.config.title,
            size.width,
            size.height
        );

        let gpu_init = self.gpu_init.clone();

        WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
    }

    /// Window, context, then app setup, short-circuiting on the first failure.
    fn setup(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SetupError> {
        let entry = self.create_window_entry(event_loop)?;

        let app = &mut self.app;
        entry.with_gpu(|gpu| {
            let ctx = RenderCtx::new(
                gpu.device(),
                gpu.queue(),
                gpu.surface_format(),
                gpu.viewport(),
            );
            app.on_init(&ctx)
        })?;

        entry.with_window(|w| w.request_redraw());
        self.entry = Some(entry);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: SetupError) {
        log::debug!("setup aborted ({}); tearing down", err.kind.as_str());
        self.entry = None;
        self.failure = Some(err);
        event_loop.exit();
    }

    /// Releases the window and its context, then stops the event loop.
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.take().is_some() {
            log::debug!("window and GPU context released");
        }
        event_loop.exit();
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.failure.is_some() || !self.frame_loop.is_running() {
            return;
        }

        if let Err(err) = self.setup(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.frame_loop.is_running() {
            self.shutdown(event_loop);
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw: one loop iteration per RedrawRequested.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        entry.with_mut(|fields| {
            if let Some(ev) = translate_window_event(&event) {
                fields.input_state.apply_event(fields.input_frame, ev);
            }
        });

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.frame_loop.request_close(CloseReason::App);
        }

        match &event {
            WindowEvent::CloseRequested => {
                self.frame_loop.request_close(CloseReason::WindowClosed);
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let cancel_key = self.config.cancel_key;
                let app = &mut self.app;
                let frame_loop = &mut self.frame_loop;

                entry.with_mut(|fields| {
                    let cancel_pressed =
                        cancel_key.is_some_and(|k| fields.input_frame.key_pressed(k));

                    frame_loop.iterate(cancel_pressed, || {
                        let mut ctx = FrameCtx {
                            window: fields.window,
                            gpu: fields.gpu,
                            input_frame: fields.input_frame,
                            time: fields.clock.tick(),
                            presented: false,
                        };
                        let control = app.on_frame(&mut ctx);
                        Iteration {
                            control,
                            presented: ctx.presented,
                        }
                    });

                    // Per-frame deltas are consumed by exactly one iteration.
                    fields.input_frame.clear();
                });
            }

            _ => {}
        }

        if !self.frame_loop.is_running() {
            self.shutdown(event_loop);
        }
    }
}
