//! Floor material with grid tint or halftone overlay

use super::shaders::{self, OVERLAY};
use super::traits::{Material, SurfaceLayouts};
use crate::context::WgpuContext;
use crate::core::buffer::{uniform_layout_entry, RawUniformBuffer};
use crate::core::pipeline::PipelineBuilder;
use crate::core::render_states::{CullState, DepthState};
use crate::core::vertex::VertexPN;
use crate::renderer::shading::{MaterialParams, OverlayConfig};

/// Overlay uniform data for GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayUniform {
    pub base_color: [f32; 4],
    /// metallic, roughness, mode, darkness.
    pub surface: [f32; 4],
    pub tint: [f32; 4],
    /// scale, line width, feather.
    pub grid: [f32; 4],
    /// period, line width, angle, feather.
    pub hatch: [f32; 4],
    /// period, radius, anti-aliasing band.
    pub dots: [f32; 4],
    /// threshold, ink, paper.
    pub halftone: [f32; 4],
}

impl OverlayUniform {
    pub fn new(base: &MaterialParams, overlay: &OverlayConfig) -> Self {
        let mode = if overlay.enabled {
            overlay.mode.index() as f32
        } else {
            0.0
        };

        Self {
            base_color: base.albedo.extend(1.0).to_array(),
            surface: [base.metallic, base.roughness, mode, overlay.darkness],
            tint: overlay.tint.extend(1.0).to_array(),
            grid: [
                overlay.grid.scale,
                overlay.grid.line_width,
                overlay.grid.feather,
                0.0,
            ],
            hatch: [
                overlay.hatch.period,
                overlay.hatch.line_width,
                overlay.hatch.angle,
                overlay.hatch.feather,
            ],
            dots: [
                overlay.dot.period_px,
                overlay.dot.radius_px,
                overlay.dot.aa_px,
                0.0,
            ],
            halftone: [overlay.threshold, overlay.ink, overlay.paper, 0.0],
        }
    }
}

/// Shaded surface with a procedural overlay on top.
pub struct OverlayMaterial {
    pipeline: wgpu::RenderPipeline,
    buffer: RawUniformBuffer,
    bind_group: wgpu::BindGroup,
    uniform: OverlayUniform,
}

impl OverlayMaterial {
    /// Create a new overlay material.
    pub fn new(
        ctx: &WgpuContext,
        layouts: &SurfaceLayouts,
        format: wgpu::TextureFormat,
        base: &MaterialParams,
        overlay: &OverlayConfig,
    ) -> anyhow::Result<Self> {
        let shader = shaders::surface_source(layouts.encoding(), OVERLAY)?;

        let material_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("overlay material bind group layout"),
                    entries: &[uniform_layout_entry(0, wgpu::ShaderStages::FRAGMENT)],
                });

        let pipeline = PipelineBuilder::new(ctx)
            .label("overlay material pipeline")
            .shader(&shader)
            .vertex_layout(VertexPN::layout())
            .bind_group_layout(&layouts.frame)
            .bind_group_layout(&layouts.model)
            .bind_group_layout(&material_layout)
            .color_format(format)
            .depth(DepthState::read_write())
            .cull(CullState::None)
            .build()?;

        let uniform = OverlayUniform::new(base, overlay);
        let buffer = RawUniformBuffer::for_type::<OverlayUniform>(ctx, Some("overlay material uniform"));
        buffer.write(ctx, &uniform);

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overlay material bind group"),
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
            uniform,
        })
    }

    /// Upload new parameters if they changed.
    pub fn update(&mut self, ctx: &WgpuContext, base: &MaterialParams, overlay: &OverlayConfig) {
        let uniform = OverlayUniform::new(base, overlay);
        if uniform != self.uniform {
            self.uniform = uniform;
            self.buffer.write(ctx, &uniform);
        }
    }
}

impl Material for OverlayMaterial {
    fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::shading::OverlayMode;

    #[test]
    fn test_overlay_uniform_mode() {
        let base = MaterialParams::default();
        let config = OverlayConfig::default().with_mode(OverlayMode::Dot);
        assert_eq!(OverlayUniform::new(&base, &config).surface[2], 3.0);

        let disabled = OverlayConfig {
            enabled: false,
            ..config
        };
        assert_eq!(OverlayUniform::new(&base, &disabled).surface[2], 0.0);
        assert_eq!(std::mem::size_of::<OverlayUniform>(), 112);
    }
}
