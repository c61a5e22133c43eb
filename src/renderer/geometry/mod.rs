//! Geometry abstractions
//!
//! CPU-side mesh data shared by the software depth capture and the GPU
//! meshes built from it.

mod mesh;

pub use mesh::Mesh;

use crate::core::buffer::{IndexBuffer, VertexBuffer};
use crate::core::vertex::VertexPN;
use glam::{Mat4, Vec3};
use std::f32::consts::PI;

/// Indexed triangle list with position + normal vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<VertexPN>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<VertexPN>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// UV sphere centred on the origin, counter-clockwise seen from outside.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
        let mut indices = Vec::with_capacity((rings * segments * 6) as usize);

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let y = phi.cos();
            let ring_radius = phi.sin();

            for segment in 0..=segments {
                let theta = 2.0 * PI * segment as f32 / segments as f32;
                let x = ring_radius * theta.cos();
                let z = ring_radius * theta.sin();
                vertices.push(VertexPN::new(
                    [x * radius, y * radius, z * radius],
                    [x, y, z],
                ));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;

                indices.extend_from_slice(&[current, current + 1, next]);
                indices.extend_from_slice(&[current + 1, next + 1, next]);
            }
        }

        Self { vertices, indices }
    }

    /// Horizontal plane at y = 0 facing +Y.
    pub fn plane(width: f32, depth: f32) -> Self {
        let hw = width / 2.0;
        let hd = depth / 2.0;
        let up = [0.0, 1.0, 0.0];

        Self {
            vertices: vec![
                VertexPN::new([-hw, 0.0, -hd], up),
                VertexPN::new([hw, 0.0, -hd], up),
                VertexPN::new([hw, 0.0, hd], up),
                VertexPN::new([-hw, 0.0, hd], up),
            ],
            indices: vec![0, 2, 1, 0, 3, 2],
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangles transformed by `model`, skipping out-of-range indices.
    pub fn world_triangles(&self, model: Mat4) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            let fetch = |i: u32| {
                self.vertices
                    .get(i as usize)
                    .map(|v| model.transform_point3(Vec3::from(v.position)))
            };
            Some([fetch(tri[0])?, fetch(tri[1])?, fetch(tri[2])?])
        })
    }
}

/// Trait for geometry that can be rendered.
pub trait Geometry {
    /// Get the vertex buffer.
    fn vertex_buffer(&self) -> &VertexBuffer;

    /// Get the index buffer.
    fn index_buffer(&self) -> &IndexBuffer;

    /// Draw the geometry using the given render pass.
    fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer().slice());
        render_pass.set_index_buffer(self.index_buffer().slice(), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_buffer().count(), 0, 0..1);
    }
}
