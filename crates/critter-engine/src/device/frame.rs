/// A single acquired swapchain frame.
///
/// Holding the surface texture blocks acquisition of the next one, so a frame
/// must be handed back to [`Gpu::present`](super::Gpu::present) promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
