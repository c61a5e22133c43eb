//! Depth material for shadow map generation

use super::shaders;
use crate::context::WgpuContext;
use crate::core::buffer::{uniform_layout_entry, RawUniformBuffer};
use crate::core::pipeline::PipelineBuilder;
use crate::core::render_states::{CullState, DepthState};
use crate::core::vertex::VertexPN;
use crate::renderer::shadow::DepthEncoding;
use glam::Mat4;

/// Light view-projection uniform for shadow mapping.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightMatrixUniform {
    pub light_view_proj: [[f32; 4]; 4],
}

/// Pipeline that writes light-space depth, natively or packed into RGBA8.
pub struct DepthMaterial {
    pipeline: wgpu::RenderPipeline,
    light_buffer: RawUniformBuffer,
    light_bind_group: wgpu::BindGroup,
    encoding: DepthEncoding,
}

impl DepthMaterial {
    /// Format of the packed depth color target.
    pub const PACKED_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    /// Create a new depth material.
    pub fn new(
        ctx: &WgpuContext,
        model_layout: &wgpu::BindGroupLayout,
        encoding: DepthEncoding,
    ) -> anyhow::Result<Self> {
        let shader = shaders::depth_source()?;

        // Light matrix bind group layout (group 0)
        let light_bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("depth light bind group layout"),
                    entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
                });

        let builder = PipelineBuilder::new(ctx)
            .shader(&shader)
            .vertex_layout(VertexPN::layout())
            .bind_group_layout(&light_bind_group_layout)
            .bind_group_layout(model_layout)
            .depth(DepthState::read_write())
            .cull(CullState::None);

        let pipeline = match encoding {
            DepthEncoding::Native => builder
                .label("native depth pipeline")
                .fragment_entry("fs_native")
                .build_depth_only()?,
            DepthEncoding::PackedRgba8 => builder
                .label("packed depth pipeline")
                .fragment_entry("fs_packed")
                .color_format(Self::PACKED_FORMAT)
                .build()?,
        };

        let light_buffer =
            RawUniformBuffer::for_type::<LightMatrixUniform>(ctx, Some("depth light uniform"));

        let light_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("depth light bind group"),
            layout: &light_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.buffer().as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            light_buffer,
            light_bind_group,
            encoding,
        })
    }

    /// Upload the light view-projection for the next capture.
    pub fn update_light(&self, ctx: &WgpuContext, light_view_proj: Mat4) {
        let uniform = LightMatrixUniform {
            light_view_proj: light_view_proj.to_cols_array_2d(),
        };
        self.light_buffer.write(ctx, &uniform);
    }

    /// Get the render pipeline.
    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Get the light matrix bind group.
    pub fn light_bind_group(&self) -> &wgpu::BindGroup {
        &self.light_bind_group
    }

    pub fn encoding(&self) -> DepthEncoding {
        self.encoding
    }
}
