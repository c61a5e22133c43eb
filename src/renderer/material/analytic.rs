//! Analytic surface material (Lambert + Blinn-Phong with hard shadows)

use super::shaders::{self, ANALYTIC};
use super::traits::{Material, SurfaceLayouts};
use crate::context::WgpuContext;
use crate::core::buffer::{uniform_layout_entry, RawUniformBuffer};
use crate::core::pipeline::PipelineBuilder;
use crate::core::render_states::{CullState, DepthState};
use crate::core::vertex::VertexPN;
use crate::renderer::shading::MaterialParams;

/// Material uniform data for GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub albedo: [f32; 4],
    /// metallic, roughness.
    pub params: [f32; 4],
}

impl From<&MaterialParams> for MaterialUniform {
    fn from(params: &MaterialParams) -> Self {
        Self {
            albedo: params.albedo.extend(1.0).to_array(),
            params: [params.metallic, params.roughness, 0.0, 0.0],
        }
    }
}

/// Surface shaded by the analytic model.
pub struct AnalyticMaterial {
    pipeline: wgpu::RenderPipeline,
    buffer: RawUniformBuffer,
    bind_group: wgpu::BindGroup,
    params: MaterialParams,
}

impl AnalyticMaterial {
    /// Create a new analytic material.
    pub fn new(
        ctx: &WgpuContext,
        layouts: &SurfaceLayouts,
        format: wgpu::TextureFormat,
        params: MaterialParams,
    ) -> anyhow::Result<Self> {
        let shader = shaders::surface_source(layouts.encoding(), ANALYTIC)?;

        let material_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("analytic material bind group layout"),
                    entries: &[uniform_layout_entry(0, wgpu::ShaderStages::FRAGMENT)],
                });

        let pipeline = PipelineBuilder::new(ctx)
            .label("analytic material pipeline")
            .shader(&shader)
            .vertex_layout(VertexPN::layout())
            .bind_group_layout(&layouts.frame)
            .bind_group_layout(&layouts.model)
            .bind_group_layout(&material_layout)
            .color_format(format)
            .depth(DepthState::read_write())
            .cull(CullState::Back)
            .build()?;

        let buffer = RawUniformBuffer::for_type::<MaterialUniform>(ctx, Some("analytic material uniform"));
        buffer.write(ctx, &MaterialUniform::from(&params));

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("analytic material bind group"),
            layout: &material_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.buffer().as_entire_binding(),
            }],
        });

        Ok(Self {
            pipeline,
            buffer,
            bind_group,
            params,
        })
    }

    /// Replace the material parameters.
    pub fn set_params(&mut self, ctx: &WgpuContext, params: MaterialParams) {
        if params != self.params {
            self.params = params;
            self.buffer.write(ctx, &MaterialUniform::from(&params));
        }
    }

    pub fn params(&self) -> &MaterialParams {
        &self.params
    }
}

impl Material for AnalyticMaterial {
    fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
