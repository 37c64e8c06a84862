use crate::error::SetupError;
use crate::paint::Color;

use super::mesh::MeshData;
use super::registry::MeshRegistry;
use super::shader::{ProgramSource, ShaderProgram};
use super::{RenderCtx, RenderTarget};

/// Draws a fixed set of static meshes with one shader program.
///
/// Everything is created up front by [`MeshRenderer::new`]; per frame only the
/// tint uniform may change.
pub struct MeshRenderer {
    program: ShaderProgram,
    meshes: MeshRegistry,
}

impl MeshRenderer {
    /// Builds the program, then uploads `meshes` in draw order.
    pub fn new(
        ctx: &RenderCtx<'_>,
        source: &ProgramSource<'_>,
        meshes: &[MeshData<'_>],
    ) -> Result<Self, SetupError> {
        let program = ShaderProgram::build(ctx.device, ctx.surface_format, source)?;
        let meshes = MeshRegistry::upload_all(ctx.device, meshes)?;
        Ok(Self { program, meshes })
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn meshes(&self) -> &MeshRegistry {
        &self.meshes
    }

    pub fn set_tint(&self, ctx: &RenderCtx<'_>, color: Color) {
        self.program.set_tint(ctx.queue, color);
    }

    /// Records one pass that binds the program and draws every mesh on top of
    /// the target's current contents.
    pub fn render(&self, ctx: &RenderCtx<'_>, target: &mut RenderTarget<'_>) {
        if ctx.viewport.is_empty() || self.meshes.is_empty() {
            return;
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("critter mesh pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let (x, y, w, h, near, far) = ctx.viewport.as_pass_args();
        rpass.set_viewport(x, y, w, h, near, far);

        self.program.bind(&mut rpass);
        self.meshes.draw(&mut rpass);
    }
}
