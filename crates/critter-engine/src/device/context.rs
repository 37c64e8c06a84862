use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::Viewport;
use crate::error::SetupError;

use super::surface;
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// GPU context bound to one window.
///
/// Owns the surface (swapchain), device and queue, plus the viewport that
/// tracks the drawable size. The window must outlive it (`'w`).
pub struct Gpu<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels (may be 0x0 while minimized).
    size: PhysicalSize<u32>,

    /// Last non-empty viewport; starts at the window's actual inner size.
    viewport: Viewport,
}

impl<'w> Gpu<'w> {
    /// Acquires a surface, adapter and device for `window`.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu; callers block on
    /// it with `pollster`. Every failure is a `ContextLoaderFailed`.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self, SetupError> {
        let size = window.inner_size();
        if size.width == 0 || size.height == 0 {
            return Err(SetupError::context("window has zero size"));
        }

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            backends,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| SetupError::context(format!("failed to create surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SetupError::context(format!("no suitable GPU adapter: {e}")))?;

        let adapter_info = adapter.get_info();

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("critter device"),
                required_features: wgpu::Features::empty(),
                required_limits: required_limits.using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| SetupError::context(format!("failed to create device/queue: {e}")))?;

        let caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&caps, prefer_srgb)
            .ok_or_else(|| SetupError::context("surface reports no supported formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode: surface::choose_alpha_mode(&caps, alpha_mode),
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        log::info!(
            "gpu ready: {} ({:?}), surface {:?} {}x{}",
            adapter_info.name,
            adapter_info.backend,
            format,
            size.width,
            size.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            viewport: Viewport::full(size.width, size.height),
        })
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Active viewport: `(0, 0, w, h)` for the last non-empty size.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Reconfigures the surface and resets the viewport after a resize.
    ///
    /// A zero-area size (minimized window) keeps the previous viewport.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let configured = surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );

        if configured {
            if let Some(vp) = Viewport::after_resize(new_size.width, new_size.height) {
                self.viewport = vp;
                log::debug!("viewport set to {}x{}", vp.width, vp.height);
            }
        }
    }

    /// Whether the surface can currently be drawn to.
    pub fn is_drawable(&self) -> bool {
        self.size.width > 0 && self.size.height > 0
    }

    /// Acquires the next surface texture and creates an encoder.
    pub fn begin_frame(&self) -> Result<GpuFrame, wgpu::SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("critter frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the frame.
    pub fn present(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Converts a `SurfaceError` into what the loop should do next.
    pub fn handle_surface_error(&mut self, err: wgpu::SurfaceError) -> SurfaceErrorAction {
        log::warn!("surface error: {err}");
        surface::map_surface_error(&self.surface, &self.device, &self.config, self.size, err)
    }
}
