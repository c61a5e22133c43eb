//! Frame renderer
//!
//! Records the depth capture and the main shading pass of a [`Scene`].

use crate::context::WgpuContext;
use crate::core::buffer::RawUniformBuffer;
use crate::core::render_states::ClearState;
use crate::core::render_target::RenderTarget;
use crate::core::texture::{ColorTexture, DepthTexture};
use crate::renderer::geometry::{Geometry, Mesh};
use crate::renderer::material::{
    AnalyticMaterial, FrameUniform, Material, ModelBinding, OverlayMaterial, SurfaceLayouts,
};
use crate::renderer::shadow::{DepthEncoding, DirectionalShadow};
use crate::scene::Scene;

/// Shadow texture bound while no capture exists.
enum Placeholder {
    Native(DepthTexture),
    Packed(ColorTexture),
}

impl Placeholder {
    fn new(ctx: &WgpuContext, encoding: DepthEncoding) -> Self {
        match encoding {
            DepthEncoding::Native => {
                Self::Native(DepthTexture::new(ctx, 1, 1, Some("shadow placeholder")))
            }
            DepthEncoding::PackedRgba8 => {
                Self::Packed(ColorTexture::solid(ctx, [255; 4], Some("shadow placeholder")))
            }
        }
    }

    fn view(&self) -> &wgpu::TextureView {
        match self {
            Self::Native(texture) => texture.view(),
            Self::Packed(texture) => texture.view(),
        }
    }
}

/// Group 0 resources.
struct FrameResources {
    layouts: SurfaceLayouts,
    uniform: RawUniformBuffer,
    placeholder: Placeholder,
}

impl FrameResources {
    fn bind_group(&self, ctx: &WgpuContext, shadow_view: &wgpu::TextureView) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame bind group"),
            layout: &self.layouts.frame,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(shadow_view),
                },
            ],
        })
    }
}

/// GPU meshes with their transforms and materials.
struct Drawables {
    floor: Mesh,
    floor_binding: ModelBinding,
    floor_material: OverlayMaterial,
    floor_casts_shadow: bool,
    subject: Mesh,
    subject_binding: ModelBinding,
    subject_material: AnalyticMaterial,
    subject_casts_shadow: bool,
    model: Option<Mesh>,
    model_binding: ModelBinding,
    model_material: AnalyticMaterial,
}

impl Drawables {
    fn sync(&mut self, ctx: &WgpuContext, scene: &Scene) {
        self.floor_binding.write(ctx, scene.floor().transform);
        self.floor_material.update(ctx, scene.floor_material(), scene.overlay());
        self.floor_casts_shadow = scene.floor().casts_shadow;

        self.subject_binding.write(ctx, scene.subject().transform);
        self.subject_material.set_params(ctx, *scene.subject_material());
        self.subject_casts_shadow = scene.subject().casts_shadow;

        if let Some(model) = scene.animated_model() {
            if let Some(mesh) = &self.model {
                mesh.update_vertices(ctx, model.skinned_vertices());
            } else {
                tracing::debug!("uploading skinned model mesh");
                self.model = Some(Mesh::new_dynamic(
                    ctx,
                    &model.mesh_data(),
                    Some("skinned model"),
                ));
            }
        } else {
            self.model = None;
        }
        self.model_binding.write(ctx, scene.model_transform());
        self.model_material.set_params(ctx, *scene.model_material());
    }

    fn casters(&self) -> Vec<(&wgpu::BindGroup, &dyn Geometry)> {
        let mut casters: Vec<(&wgpu::BindGroup, &dyn Geometry)> = Vec::with_capacity(3);
        if self.floor_casts_shadow {
            casters.push((self.floor_binding.bind_group(), &self.floor));
        }
        if self.subject_casts_shadow {
            casters.push((self.subject_binding.bind_group(), &self.subject));
        }
        if let Some(model) = &self.model {
            casters.push((self.model_binding.bind_group(), model));
        }
        casters
    }

    fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, frame: &wgpu::BindGroup) {
        render_pass.set_bind_group(0, frame, &[]);
        draw_with(
            render_pass,
            &self.floor_material,
            &self.floor_binding,
            &self.floor,
        );
        draw_with(
            render_pass,
            &self.subject_material,
            &self.subject_binding,
            &self.subject,
        );
        if let Some(model) = &self.model {
            draw_with(render_pass, &self.model_material, &self.model_binding, model);
        }
    }
}

fn draw_with(
    render_pass: &mut wgpu::RenderPass<'_>,
    material: &dyn Material,
    binding: &ModelBinding,
    geometry: &dyn Geometry,
) {
    render_pass.set_pipeline(material.pipeline());
    render_pass.set_bind_group(1, binding.bind_group(), &[]);
    render_pass.set_bind_group(2, material.bind_group(), &[]);
    geometry.draw(render_pass);
}

/// Renders a [`Scene`] with one shadow-casting directional light.
pub struct SceneRenderer {
    frame: FrameResources,
    shadow: DirectionalShadow,
    drawables: Drawables,
}

impl SceneRenderer {
    /// Create every pipeline and GPU resource the scene needs.
    ///
    /// `format` must be a non-sRGB format; the surface shaders gamma-encode
    /// their output themselves.
    pub fn new(
        ctx: &WgpuContext,
        format: wgpu::TextureFormat,
        scene: &Scene,
    ) -> anyhow::Result<Self> {
        if format.is_srgb() {
            tracing::warn!("{:?} is sRGB, output will be gamma-encoded twice", format);
        }

        let shadow_config = scene
            .config()
            .shadow
            .with_resolution(scene.light().shadow_resolution());
        let layouts = SurfaceLayouts::new(ctx, shadow_config.encoding);
        let shadow = DirectionalShadow::new(ctx, &layouts.model, shadow_config)?;

        let drawables = Drawables {
            floor: Mesh::new(ctx, &scene.floor().mesh, Some("floor")),
            floor_binding: ModelBinding::new(ctx, &layouts.model, Some("floor model")),
            floor_material: OverlayMaterial::new(
                ctx,
                &layouts,
                format,
                scene.floor_material(),
                scene.overlay(),
            )?,
            floor_casts_shadow: scene.floor().casts_shadow,
            subject: Mesh::new(ctx, &scene.subject().mesh, Some("subject")),
            subject_binding: ModelBinding::new(ctx, &layouts.model, Some("subject model")),
            subject_material: AnalyticMaterial::new(
                ctx,
                &layouts,
                format,
                *scene.subject_material(),
            )?,
            subject_casts_shadow: scene.subject().casts_shadow,
            model: None,
            model_binding: ModelBinding::new(ctx, &layouts.model, Some("skinned model")),
            model_material: AnalyticMaterial::new(ctx, &layouts, format, *scene.model_material())?,
        };

        let frame = FrameResources {
            uniform: RawUniformBuffer::for_type::<FrameUniform>(ctx, Some("frame uniform")),
            placeholder: Placeholder::new(ctx, shadow_config.encoding),
            layouts,
        };

        tracing::info!("scene renderer ready ({:?} target)", format);
        Ok(Self {
            frame,
            shadow,
            drawables,
        })
    }

    /// Record and submit one frame: depth capture first, then shading.
    ///
    /// The capture is reported back to the scene, whose next update hands it
    /// to the shading uniforms.
    pub fn render(&mut self, ctx: &WgpuContext, target: &RenderTarget<'_>, scene: &mut Scene) {
        let resolution = scene.light().shadow_resolution();
        self.shadow.set_resolution(ctx, resolution);
        self.drawables.sync(ctx, scene);

        let frame = &scene.uniforms().frame;
        self.frame
            .uniform
            .write(ctx, &FrameUniform::from_params(frame));

        let [r, g, b] = scene.config().clear_color;
        let clear = ClearState::color_and_depth([r, g, b, 1.0], ClearState::FAR_DEPTH);
        let mut encoder = ctx.create_encoder(Some("umbra frame"));

        let captured = if scene.light().casts_shadow() {
            let casters = self.drawables.casters();
            let capture = self
                .shadow
                .capture(ctx, &mut encoder, &frame.light_space, &casters);
            let bind_group = self.frame.bind_group(ctx, capture.view());
            {
                let mut render_pass = target.begin_render_pass(&mut encoder, clear);
                self.drawables.draw(&mut render_pass, &bind_group);
            }
            Some(capture.handle())
        } else {
            let bind_group = self.frame.bind_group(ctx, self.frame.placeholder.view());
            {
                let mut render_pass = target.begin_render_pass(&mut encoder, clear);
                self.drawables.draw(&mut render_pass, &bind_group);
            }
            None
        };

        ctx.submit(std::iter::once(encoder.finish()));
        if let Some(handle) = captured {
            scene.record_capture(handle);
        }
    }

    pub fn shadow(&self) -> &DirectionalShadow {
        &self.shadow
    }
}
