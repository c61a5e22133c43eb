//! Material trait and common types

use crate::context::WgpuContext;
use crate::core::buffer::{uniform_layout_entry, RawUniformBuffer};
use crate::renderer::shading::FrameParams;
use crate::renderer::shadow::DepthEncoding;
use glam::Mat4;

/// Trait for materials that control surface appearance.
///
/// Materials own bind group 2; groups 0 (frame) and 1 (model) are shared.
pub trait Material {
    /// Get the render pipeline.
    fn pipeline(&self) -> &wgpu::RenderPipeline;

    /// Get the material bind group.
    fn bind_group(&self) -> &wgpu::BindGroup;
}

/// Model uniform data for GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn from_matrix(model: Mat4) -> Self {
        let normal_matrix = model.inverse().transpose();
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
        }
    }
}

/// Per-frame uniform shared by every surface pipeline.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniform {
    pub view_proj: [[f32; 4]; 4],
    pub shadow_matrix: [[f32; 4]; 4],
    /// w: elapsed seconds.
    pub camera_position: [f32; 4],
    pub light_direction: [f32; 4],
    /// w: 1 when a captured shadow map is bound.
    pub light_radiance: [f32; 4],
    pub ambient: [f32; 4],
    /// min bias, slope scale, resolution.
    pub shadow_params: [f32; 4],
    pub viewport: [f32; 4],
}

impl FrameUniform {
    pub fn from_params(frame: &FrameParams) -> Self {
        let (shadow_enabled, resolution) = match frame.shadow_map {
            Some(handle) => (1.0, handle.resolution() as f32),
            None => (0.0, 1.0),
        };

        Self {
            view_proj: frame.view_projection.to_cols_array_2d(),
            shadow_matrix: frame.light_space.shadow_matrix().to_cols_array_2d(),
            camera_position: frame.camera_position.extend(frame.elapsed).to_array(),
            light_direction: frame.light_direction.extend(0.0).to_array(),
            light_radiance: frame.light_radiance.extend(shadow_enabled).to_array(),
            ambient: [frame.ambient, 0.0, 0.0, 0.0],
            shadow_params: [
                frame.bias.min_bias,
                frame.bias.slope_scale,
                resolution,
                0.0,
            ],
            viewport: [frame.viewport.0 as f32, frame.viewport.1 as f32, 0.0, 0.0],
        }
    }
}

/// Bind group layouts of groups 0 and 1, shared by every surface pipeline.
pub struct SurfaceLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub model: wgpu::BindGroupLayout,
    encoding: DepthEncoding,
}

impl SurfaceLayouts {
    pub fn new(ctx: &WgpuContext, encoding: DepthEncoding) -> Self {
        let sample_type = match encoding {
            DepthEncoding::Native => wgpu::TextureSampleType::Depth,
            DepthEncoding::PackedRgba8 => wgpu::TextureSampleType::Float { filterable: false },
        };

        let frame = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("frame bind group layout"),
                entries: &[
                    uniform_layout_entry(
                        0,
                        wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ),
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                ],
            });

        let model = model_bind_group_layout(ctx);

        Self {
            frame,
            model,
            encoding,
        }
    }

    /// Encoding the frame layout's shadow binding expects.
    pub fn encoding(&self) -> DepthEncoding {
        self.encoding
    }
}

/// Layout of the per-object model uniform (group 1).
pub fn model_bind_group_layout(ctx: &WgpuContext) -> wgpu::BindGroupLayout {
    ctx.device
        .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("model bind group layout"),
            entries: &[uniform_layout_entry(0, wgpu::ShaderStages::VERTEX)],
        })
}

/// Model uniform buffer and bind group owned by one drawable.
pub struct ModelBinding {
    buffer: RawUniformBuffer,
    bind_group: wgpu::BindGroup,
}

impl ModelBinding {
    pub fn new(ctx: &WgpuContext, layout: &wgpu::BindGroupLayout, label: Option<&str>) -> Self {
        let buffer = RawUniformBuffer::for_type::<ModelUniform>(ctx, label);
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label,
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.buffer().as_entire_binding(),
            }],
        });
        Self { buffer, bind_group }
    }

    pub fn write(&self, ctx: &WgpuContext, model: Mat4) {
        self.buffer.write(ctx, &ModelUniform::from_matrix(model));
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::shadow::ShadowMapHandle;
    use glam::Vec3;

    #[test]
    fn test_uniform_sizes() {
        assert_eq!(std::mem::size_of::<ModelUniform>(), 128);
        // two matrices and six vec4s, a multiple of 16 bytes
        assert_eq!(std::mem::size_of::<FrameUniform>(), 224);
    }

    #[test]
    fn test_frame_uniform_shadow_flag() {
        let mut frame = FrameParams::default();
        assert_eq!(FrameUniform::from_params(&frame).light_radiance[3], 0.0);

        frame.shadow_map = Some(ShadowMapHandle::new(1, 1024, DepthEncoding::Native));
        frame.light_radiance = Vec3::splat(2.0);
        let uniform = FrameUniform::from_params(&frame);
        assert_eq!(uniform.light_radiance, [2.0, 2.0, 2.0, 1.0]);
        assert_eq!(uniform.shadow_params[2], 1024.0);
    }

    #[test]
    fn test_normal_matrix_of_uniform_scale() {
        let uniform = ModelUniform::from_matrix(Mat4::from_scale(Vec3::splat(2.0)));
        assert!((uniform.normal_matrix[0][0] - 0.5).abs() < 1e-6);
    }
}
