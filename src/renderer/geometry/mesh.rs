//! GPU mesh

use super::{Geometry, MeshData};
use crate::context::WgpuContext;
use crate::core::buffer::{IndexBuffer, VertexBuffer};
use crate::core::vertex::VertexPN;

/// A mesh uploaded to vertex and index buffers.
pub struct Mesh {
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
}

impl Mesh {
    /// Upload static mesh data.
    pub fn new(ctx: &WgpuContext, data: &MeshData, label: Option<&str>) -> Self {
        Self {
            vertex_buffer: VertexBuffer::new(ctx, &data.vertices, label),
            index_buffer: IndexBuffer::new(ctx, &data.indices, label),
        }
    }

    /// Upload mesh data whose vertices are rewritten every frame (skinning).
    pub fn new_dynamic(ctx: &WgpuContext, data: &MeshData, label: Option<&str>) -> Self {
        Self {
            vertex_buffer: VertexBuffer::new_dynamic(ctx, &data.vertices, label),
            index_buffer: IndexBuffer::new(ctx, &data.indices, label),
        }
    }

    /// Overwrite the vertex stream of a dynamic mesh.
    pub fn update_vertices(&self, ctx: &WgpuContext, vertices: &[VertexPN]) {
        if vertices.len() as u32 != self.vertex_buffer.count() {
            tracing::warn!(
                "ignoring vertex update with {} vertices, mesh has {}",
                vertices.len(),
                self.vertex_buffer.count()
            );
            return;
        }
        self.vertex_buffer.write(ctx, vertices);
    }

    /// Create a sphere mesh.
    pub fn sphere(ctx: &WgpuContext, radius: f32, segments: u32, rings: u32) -> Self {
        Self::new(ctx, &MeshData::sphere(radius, segments, rings), Some("sphere"))
    }

    /// Create a plane mesh (XZ plane).
    pub fn plane(ctx: &WgpuContext, width: f32, depth: f32) -> Self {
        Self::new(ctx, &MeshData::plane(width, depth), Some("plane"))
    }
}

impl Geometry for Mesh {
    fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertex_buffer
    }

    fn index_buffer(&self) -> &IndexBuffer {
        &self.index_buffer
    }
}
