//! GPU rendering: shader programs, static meshes and the pass that draws them.
//!
//! Geometry is authored directly in normalized device coordinates; there is
//! no camera or transform stage.

mod ctx;
mod mesh;
mod registry;
mod renderer;
mod shader;

pub use ctx::{RenderCtx, RenderTarget};
pub use mesh::{position_layout, DrawCall, Mesh, MeshData, Position};
pub use registry::MeshRegistry;
pub use renderer::MeshRenderer;
pub use shader::{
    check_program, ProgramSource, ShaderProgram, FRAGMENT_ENTRY, POSITION_SLOT, VERTEX_ENTRY,
};

/// Headless device for GPU-backed tests.
#[cfg(test)]
pub(crate) fn test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
            .ok()?;
        adapter
            .request_device(&wgpu::DeviceDescriptor::default())
            .await
            .ok()
    })
}
