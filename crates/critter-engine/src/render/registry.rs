use crate::error::SetupError;

use super::mesh::{Mesh, MeshData};

/// Meshes owned by name, kept in insertion order.
///
/// Insertion order is draw order.
#[derive(Default)]
pub struct MeshRegistry {
    meshes: Vec<Mesh>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates every entry first, then uploads them in order.
    ///
    /// Nothing is uploaded if any entry is invalid.
    pub fn upload_all(device: &wgpu::Device, data: &[MeshData<'_>]) -> Result<Self, SetupError> {
        check_names(data)?;
        for mesh in data {
            mesh.validate()?;
        }

        let mut registry = Self::new();
        for mesh in data {
            registry.insert(Mesh::upload(device, mesh)?)?;
        }

        log::info!("uploaded {} static meshes", registry.len());
        Ok(registry)
    }

    /// Appends `mesh` to the end of the draw order.
    pub fn insert(&mut self, mesh: Mesh) -> Result<(), SetupError> {
        if self.get(mesh.name()).is_some() {
            return Err(SetupError::mesh(mesh.name(), "name already registered"));
        }
        self.meshes.push(mesh);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|m| m.name() == name)
    }

    /// Meshes in draw order.
    pub fn iter(&self) -> impl Iterator<Item = &Mesh> {
        self.meshes.iter()
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Draws every mesh in order. The program must already be bound.
    pub(crate) fn draw(&self, rpass: &mut wgpu::RenderPass<'_>) {
        for mesh in &self.meshes {
            mesh.draw(rpass);
        }
    }
}

/// Rejects duplicate names before anything touches the device.
fn check_names(data: &[MeshData<'_>]) -> Result<(), SetupError> {
    for (i, mesh) in data.iter().enumerate() {
        if data[..i].iter().any(|m| m.name == mesh.name) {
            return Err(SetupError::mesh(mesh.name, "name already registered"));
        }
    }
    Ok(())
}
