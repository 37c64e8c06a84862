use wgpu::util::DeviceExt;

use crate::error::SetupError;

/// One vertex position in normalized device coordinates.
pub type Position = [f32; 3];

const POSITION_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

/// Vertex layout shared by every mesh: slot 0, three tightly packed floats.
pub fn position_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Position>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &POSITION_ATTRS,
    }
}

/// How a mesh is drawn: through its index buffer or straight from its vertices.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DrawCall {
    Indexed { index_count: u32 },
    Direct { vertex_count: u32 },
}

impl DrawCall {
    /// Number of vertices the draw call feeds to the vertex stage.
    pub fn vertices_issued(self) -> u32 {
        match self {
            DrawCall::Indexed { index_count } => index_count,
            DrawCall::Direct { vertex_count } => vertex_count,
        }
    }

    pub fn triangle_count(self) -> u32 {
        self.vertices_issued() / 3
    }
}

/// CPU-side literal description of a static mesh.
///
/// Positions are a triangle list when `indices` is `None`.
#[derive(Debug, Copy, Clone)]
pub struct MeshData<'a> {
    pub name: &'a str,
    pub positions: &'a [Position],
    pub indices: Option<&'a [u32]>,
}

impl<'a> MeshData<'a> {
    pub const fn indexed(name: &'a str, positions: &'a [Position], indices: &'a [u32]) -> Self {
        Self {
            name,
            positions,
            indices: Some(indices),
        }
    }

    pub const fn direct(name: &'a str, positions: &'a [Position]) -> Self {
        Self {
            name,
            positions,
            indices: None,
        }
    }

    /// Checks the mesh invariants: non-empty, finite positions, whole
    /// triangles, and every index a valid offset into `positions`.
    pub fn validate(&self) -> Result<(), SetupError> {
        let err = |detail: String| SetupError::mesh(self.name, detail);

        if self.positions.is_empty() {
            return Err(err("no vertices".to_string()));
        }
        if u32::try_from(self.positions.len()).is_err() {
            return Err(err(format!("{} vertices exceed u32", self.positions.len())));
        }
        if let Some(i) = self
            .positions
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(err(format!("vertex {i} is not finite")));
        }

        match self.indices {
            None => {
                if self.positions.len() % 3 != 0 {
                    return Err(err(format!(
                        "{} vertices do not form whole triangles",
                        self.positions.len()
                    )));
                }
            }
            Some(indices) => {
                if indices.is_empty() || indices.len() % 3 != 0 {
                    return Err(err(format!(
                        "{} indices do not form whole triangles",
                        indices.len()
                    )));
                }
                if u32::try_from(indices.len()).is_err() {
                    return Err(err(format!("{} indices exceed u32", indices.len())));
                }
                let vertex_count = self.positions.len();
                if let Some((slot, bad)) = indices
                    .iter()
                    .enumerate()
                    .find(|(_, i)| **i as usize >= vertex_count)
                {
                    return Err(err(format!(
                        "index {bad} at slot {slot} is out of range for {vertex_count} vertices"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Draw call for this mesh. Only meaningful once `validate` succeeded.
    pub fn draw_call(&self) -> DrawCall {
        match self.indices {
            Some(indices) => DrawCall::Indexed {
                index_count: indices.len() as u32,
            },
            None => DrawCall::Direct {
                vertex_count: self.positions.len() as u32,
            },
        }
    }
}

/// A mesh resident in device memory.
///
/// Buffers are written once at upload and never touched again.
pub struct Mesh {
    name: String,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
    /// Index buffer and its length, for indexed meshes.
    index_buffer: Option<(wgpu::Buffer, u32)>,
}

impl Mesh {
    /// Validates `data` and copies it into fresh device buffers.
    ///
    /// Every call allocates new buffers; uploading the same data twice yields
    /// two independent meshes.
    pub fn upload(device: &wgpu::Device, data: &MeshData<'_>) -> Result<Self, SetupError> {
        data.validate()?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("critter mesh `{}` vbo", data.name)),
            contents: bytemuck::cast_slice(data.positions),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = data.indices.map(|indices| {
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("critter mesh `{}` ibo", data.name)),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            (buffer, indices.len() as u32)
        });

        log::debug!(
            "uploaded mesh `{}`: {} vertices, {:?}",
            data.name,
            data.positions.len(),
            data.draw_call()
        );

        Ok(Self {
            name: data.name.to_string(),
            vertex_buffer,
            vertex_count: data.positions.len() as u32,
            index_buffer,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn draw_call(&self) -> DrawCall {
        match &self.index_buffer {
            Some((_, index_count)) => DrawCall::Indexed {
                index_count: *index_count,
            },
            None => DrawCall::Direct {
                vertex_count: self.vertex_count,
            },
        }
    }

    /// Binds this mesh's buffers and issues its draw call.
    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

        match &self.index_buffer {
            Some((ibo, index_count)) => {
                rpass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..*index_count, 0, 0..1);
            }
            None => rpass.draw(0..self.vertex_count, 0..1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetupErrorKind;

    const QUAD: [Position; 4] = [
        [0.5, 0.5, 0.0],
        [0.5, -0.5, 0.0],
        [-0.5, -0.5, 0.0],
        [-0.5, 0.5, 0.0],
    ];
    const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

    #[test]
    fn indexed_quad_draws_six_indices() {
        let mesh = MeshData::indexed("quad", &QUAD, &QUAD_INDICES);
        mesh.validate().unwrap();
        assert_eq!(mesh.draw_call(), DrawCall::Indexed { index_count: 6 });
        assert_eq!(mesh.draw_call().triangle_count(), 2);
    }

    #[test]
    fn direct_mesh_draws_every_vertex() {
        let tri = [[0.0, 0.5, 0.0], [-0.5, -0.5, 0.0], [0.5, -0.5, 0.0]];
        let mesh = MeshData::direct("tri", &tri);
        mesh.validate().unwrap();
        assert_eq!(mesh.draw_call(), DrawCall::Direct { vertex_count: 3 });
        assert_eq!(mesh.draw_call().vertices_issued(), 3);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let mesh = MeshData::indexed("bad", &QUAD, &[0, 1, 4]);
        let err = mesh.validate().unwrap_err();
        assert_eq!(err.kind, SetupErrorKind::InvalidMesh);
        assert_eq!(err.subsystem, "mesh:bad");
        assert!(err.detail.contains("index 4"));
    }

    #[test]
    fn partial_triangle_is_rejected() {
        assert!(MeshData::indexed("q", &QUAD, &[0, 1]).validate().is_err());
        assert!(MeshData::direct("q", &QUAD).validate().is_err());
    }

    #[test]
    fn empty_mesh_is_rejected() {
        assert!(MeshData::direct("none", &[]).validate().is_err());
        assert!(MeshData::indexed("none", &QUAD, &[]).validate().is_err());
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let tri = [[0.0, f32::NAN, 0.0], [-0.5, -0.5, 0.0], [0.5, -0.5, 0.0]];
        let err = MeshData::direct("nan", &tri).validate().unwrap_err();
        assert!(err.detail.contains("vertex 0"));
    }

    #[test]
    fn layout_is_three_floats_at_slot_zero() {
        let layout = position_layout();
        assert_eq!(layout.array_stride, 12);
        assert_eq!(layout.attributes.len(), 1);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);
    }

    #[test]
    #[ignore = "requires a GPU adapter"]
    fn upload_twice_gives_independent_meshes() {
        let (device, _queue) = crate::render::test_device().expect("no GPU adapter available");
        let data = MeshData::indexed("quad", &QUAD, &QUAD_INDICES);
        let a = Mesh::upload(&device, &data).unwrap();
        let b = Mesh::upload(&device, &data).unwrap();
        assert_eq!(a.name(), b.name());
        assert_eq!(a.draw_call(), b.draw_call());
        assert!(a.index_buffer.is_some() && b.index_buffer.is_some());
    }
}
