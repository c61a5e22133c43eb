//! Directional light shadow mapping

use super::{DepthEncoding, LightSpaceTransform, ShadowConfig, ShadowMapHandle};
use crate::context::WgpuContext;
use crate::core::render_states::ClearState;
use crate::core::texture::{ColorTexture, DepthTexture};
use crate::renderer::geometry::Geometry;
use crate::renderer::material::DepthMaterial;

/// Off-screen target of the depth capture.
enum CaptureTarget {
    Native(DepthTexture),
    Packed {
        color: ColorTexture,
        depth: DepthTexture,
    },
}

impl CaptureTarget {
    fn new(ctx: &WgpuContext, encoding: DepthEncoding, resolution: u32) -> Self {
        match encoding {
            DepthEncoding::Native => {
                Self::Native(DepthTexture::new(ctx, resolution, resolution, Some("shadow map")))
            }
            DepthEncoding::PackedRgba8 => Self::Packed {
                color: ColorTexture::render_target(
                    ctx,
                    resolution,
                    resolution,
                    DepthMaterial::PACKED_FORMAT,
                    Some("packed shadow map"),
                ),
                depth: DepthTexture::new(ctx, resolution, resolution, Some("packed shadow depth")),
            },
        }
    }

    /// View the main pass samples.
    fn sample_view(&self) -> &wgpu::TextureView {
        match self {
            Self::Native(depth) => depth.view(),
            Self::Packed { color, .. } => color.view(),
        }
    }
}

/// Directional light shadow mapper.
pub struct DirectionalShadow {
    config: ShadowConfig,
    target: CaptureTarget,
    material: DepthMaterial,
    generation: u64,
}

impl DirectionalShadow {
    /// Create a new directional shadow mapper.
    pub fn new(
        ctx: &WgpuContext,
        model_layout: &wgpu::BindGroupLayout,
        config: ShadowConfig,
    ) -> anyhow::Result<Self> {
        let material = DepthMaterial::new(ctx, model_layout, config.encoding)?;
        let target = CaptureTarget::new(ctx, config.encoding, config.resolution);
        tracing::info!(
            "allocated {}x{} shadow map ({:?})",
            config.resolution,
            config.resolution,
            config.encoding
        );

        Ok(Self {
            config,
            target,
            material,
            generation: 0,
        })
    }

    /// Reallocate the map when the light asks for another resolution.
    pub fn set_resolution(&mut self, ctx: &WgpuContext, resolution: u32) {
        let resolution = resolution.max(1);
        if resolution == self.config.resolution {
            return;
        }
        self.config.resolution = resolution;
        self.target = CaptureTarget::new(ctx, self.config.encoding, resolution);
        tracing::info!("reallocated shadow map at {}x{}", resolution, resolution);
    }

    /// Record the depth pass: clear to far, then draw every caster.
    ///
    /// The returned token is the only way to bind the map for shading, so
    /// the main pass of a frame is always recorded after its depth pass.
    pub fn capture(
        &mut self,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        transform: &LightSpaceTransform,
        casters: &[(&wgpu::BindGroup, &dyn Geometry)],
    ) -> ShadowCapture<'_> {
        self.material.update_light(ctx, transform.view_projection());

        {
            let clear = ClearState::color_and_depth([1.0; 4], ClearState::FAR_DEPTH);
            let depth_ops = Some(wgpu::Operations {
                load: clear.depth_load_op(),
                store: wgpu::StoreOp::Store,
            });

            let (color_view, depth_view) = match &self.target {
                CaptureTarget::Native(depth) => (None, depth.view()),
                CaptureTarget::Packed { color, depth } => (Some(color.view()), depth.view()),
            };
            let color_attachment = color_view.map(|view| wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: clear.color_load_op(),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            });
            let color_attachments = [color_attachment];
            let color_attachments: &[Option<wgpu::RenderPassColorAttachment<'_>>] =
                if color_attachments[0].is_some() {
                    &color_attachments
                } else {
                    &[]
                };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow depth pass"),
                color_attachments,
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops,
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_pipeline(self.material.pipeline());
            render_pass.set_bind_group(0, self.material.light_bind_group(), &[]);

            for (model_bind_group, geometry) in casters {
                render_pass.set_bind_group(1, *model_bind_group, &[]);
                geometry.draw(&mut render_pass);
            }
        }

        self.generation += 1;
        let handle = ShadowMapHandle::new(self.generation, self.config.resolution, self.config.encoding);
        ShadowCapture {
            shadow: self,
            handle,
        }
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    /// Number of captures recorded so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Proof that the depth pass of the current frame has been recorded.
pub struct ShadowCapture<'a> {
    shadow: &'a DirectionalShadow,
    handle: ShadowMapHandle,
}

impl ShadowCapture<'_> {
    pub fn handle(&self) -> ShadowMapHandle {
        self.handle
    }

    /// Texture view holding the captured depth.
    pub fn view(&self) -> &wgpu::TextureView {
        self.shadow.target.sample_view()
    }
}
